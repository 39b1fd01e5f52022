mod config;

use clap::{Parser, Subcommand};
use config::SupportdeskConfig;
use std::path::PathBuf;
use std::sync::Arc;
use supportdesk_agent::{CompletionClient, SupportAgent};
use supportdesk_gateway::{spawn_expiry_sweeper, GatewayServer};
use supportdesk_session::{FileDocumentStore, SessionManager};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "supportdesk", about = "supportdesk: AI customer support service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "supportdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Inspect stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions active within the expiration window
    List,
    /// Print one session with its history
    Show { id: Uuid },
    /// Delete a session and its conversation entries
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = SupportdeskConfig::load(&cli.config).await?;

    let store = Arc::new(FileDocumentStore::new(config.data_dir.clone()).await?);
    let sessions = Arc::new(SessionManager::new(store, &config.session)?);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            if config.model.api_key.is_empty() {
                warn!(
                    env = config::API_KEY_ENV,
                    "No API key configured; completion requests will fail"
                );
            }
            info!(
                provider = ?config.model.provider,
                model = %config.model.model_id,
                fallbacks = config.model.fallback_models.len(),
                "Completion backend configured"
            );

            let agent = Arc::new(SupportAgent::new(CompletionClient::new(config.model)));
            let app =
                GatewayServer::build(sessions.clone(), agent, config.server.max_query_length);

            let sweeper = spawn_expiry_sweeper(sessions, config.session.sweep_interval());

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!(
                %addr,
                expiration_minutes = config.session.expiration_minutes,
                "supportdesk listening"
            );

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Shutdown signal received");
                })
                .await?;
            sweeper.abort();
        }
        Commands::Sessions { action } => match action {
            SessionAction::List => {
                let list = sessions.list_sessions().await?;
                if list.is_empty() {
                    println!("No active sessions.");
                } else {
                    for s in &list {
                        println!("{}  created {}", s.session_id, s.created_at.to_rfc3339());
                    }
                    println!("\nTotal: {} session(s)", list.len());
                }
            }
            SessionAction::Show { id } => match sessions.get_session(id).await? {
                Some(session) => {
                    println!("{}", serde_json::to_string_pretty(&session)?);
                    let memory = sessions.get_contextual_memory(id).await?;
                    if !memory.is_empty() {
                        println!("\nContextual memory:");
                        for item in &memory {
                            println!("  {item}");
                        }
                    }
                }
                None => anyhow::bail!("Session {id} not found"),
            },
            SessionAction::Delete { id } => {
                sessions.delete_session(id).await?;
                println!("Deleted session {id}");
            }
        },
    }

    Ok(())
}
