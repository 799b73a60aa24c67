use anyhow::Result;
use apiguard::{
    AppConfig, DatabaseConfig, PurgeOutcome, TokenCommands, TokenStore, create_app,
    create_connection, ensure_schema, load_config,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apiguard")]
#[command(about = "API token authentication and serialization group derivation")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, env = "APIGUARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Manage API tokens (requires a persistent database)
    Token {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory", global = true)]
        db_url: String,
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Print configured resources with their derived serialization groups
    Groups {
        /// Only print this resource (case-insensitive)
        #[arg(long)]
        resource: Option<String>,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Generate a new API token for a role
    ///
    /// The token is random and authenticates as a principal holding only
    /// the given role.
    Generate {
        /// The role to authenticate as
        role: String,
    },
    /// Invalidate one API token
    Invalidate {
        /// The token to invalidate
        token: String,
    },
    /// Purge all API tokens, or all tokens of one role
    Purge {
        /// The role to purge
        role: Option<String>,
        /// Execute the purge instead of only reporting it
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List stored API tokens
    List,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("apiguard=info".parse()?))
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Serve { bind, db_url } => {
            info!("Using database url for API server: {}", db_url);
            let db = create_connection(DatabaseConfig::with_url(db_url)).await?;
            let app = create_app(&config, db).await?;

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("API server listening on http://{}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            info!("Using database url for initialization: {}", db_url);
            let db = create_connection(DatabaseConfig::with_url(db_url)).await?;
            ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::Token { db_url, command } => {
            return run_token_command(&config, db_url, command).await;
        }
        Commands::Groups { resource } => {
            let resources = config.derived_resources()?;
            let selected: Vec<_> = resources
                .into_iter()
                .filter(|r| {
                    resource
                        .as_deref()
                        .is_none_or(|name| r.name.as_str().eq_ignore_ascii_case(name))
                })
                .collect();

            if selected.is_empty() {
                eprintln!("No matching resources configured.");
                return Ok(ExitCode::FAILURE);
            }

            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_token_command(
    config: &AppConfig,
    db_url: String,
    command: TokenCommand,
) -> Result<ExitCode> {
    let db_config = DatabaseConfig::with_url(db_url);
    if let Err(e) = db_config.require_persistent() {
        warn!("Refusing to manage tokens: {}", e);
        eprintln!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;
    let commands = TokenCommands::new(TokenStore::new(db), config.role_policy()?);

    match command {
        TokenCommand::Generate { role } => match commands.generate(&role).await {
            Ok(generated) => {
                println!("Token:");
                println!("{}", generated.token);
                println!();
                println!("Successfully generated token for role '{}'!", generated.role);
            }
            Err(e) => {
                eprintln!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
        },
        TokenCommand::Invalidate { token } => match commands.invalidate(&token).await {
            Ok(()) => println!("Successfully invalidated token!"),
            Err(e) => {
                eprintln!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
        },
        TokenCommand::Purge { role, force } => {
            let outcome: PurgeOutcome = match commands.purge(role.as_deref(), force).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };

            for line in outcome.report() {
                println!("{}", line);
            }

            if !outcome.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        TokenCommand::List => {
            let tokens = commands.list().await?;

            if tokens.is_empty() {
                println!("No API tokens found.");
                return Ok(ExitCode::SUCCESS);
            }

            println!("{:<20} {:<30} {:<30}", "HASH", "ROLE", "CREATED");
            println!("{}", "-".repeat(80));

            for token in tokens {
                let created = token
                    .created_at
                    .map(|dt| dt.to_string())
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "{:<20} {:<30} {:<30}",
                    token.token_hash.short(),
                    token.role,
                    created
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
