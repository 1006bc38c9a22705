//! zkvote daemon: runs the internal API or drives a login session from the
//! command line.

mod config;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use config::DaemonConfig;
use zkvote_orchestrator::{SessionOrchestrator, SessionSnapshot};
use zkvote_rpc::RpcServer;
use zkvote_session::{EphemeralKeyManager, FileSessionStore};
use zkvote_types::{AccountAddress, NetworkId};
use zkvote_utils::LogFormat;

#[derive(Parser)]
#[command(name = "zkvote", about = "Zero-knowledge login, mint and group voting")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; flags
    /// and env vars override them.
    #[arg(long, env = "ZKVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger network: "mainnet", "testnet", "devnet" or "localnet".
    #[arg(long, env = "ZKVOTE_NETWORK")]
    network: Option<NetworkId>,

    /// Full-node JSON-RPC endpoint.
    #[arg(long, env = "ZKVOTE_RPC_URL")]
    rpc_url: Option<String>,

    /// Session record file.
    #[arg(long, env = "ZKVOTE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "ZKVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, env = "ZKVOTE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the internal API (salt lookup, user store, proof proxy).
    Serve {
        /// Address to listen on.
        #[arg(long, env = "ZKVOTE_LISTEN")]
        listen: Option<String>,
    },
    /// Create an ephemeral key and print the provider login URL.
    Login,
    /// Finish the login with the token from the provider redirect.
    Callback {
        /// The raw identity token.
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        id_token: Option<String>,
        /// The full redirect URL; the token is read from its fragment.
        #[arg(long)]
        url: Option<String>,
    },
    /// Print the session state.
    Status,
    /// Submit the demo mint call.
    Mint,
    /// Vote for a member of the voting group.
    Vote {
        #[arg(long)]
        candidate: AccountAddress,
    },
    /// Forget the session.
    Logout,
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("reading config file {}", path.display()))?,
        None => DaemonConfig::default(),
    };

    if let Some(network) = cli.network {
        config.session.network = network;
    }
    if let Some(url) = &cli.rpc_url {
        config.session.rpc_url = Some(url.clone());
    }
    if let Some(path) = &cli.session_file {
        config.session.session_file = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if cli.log_json {
        config.log_format = LogFormat::Json;
    }
    if let Command::Serve {
        listen: Some(listen),
    } = &cli.command
    {
        config.service.listen_addr = listen.clone();
    }
    Ok(config)
}

/// The identity token saved by the last successful `callback`.
fn stored_token(config: &DaemonConfig) -> anyhow::Result<String> {
    let keys = EphemeralKeyManager::new(Arc::new(FileSessionStore::new(
        config.session.session_file.clone(),
    )));
    keys.record()?
        .user
        .and_then(|user| user.jwt)
        .context("no identity token stored; run `zkvote callback` first")
}

/// Reload the stored session so that actions can run in this process.
async fn resume(
    orchestrator: &SessionOrchestrator,
    config: &DaemonConfig,
) -> anyhow::Result<SessionSnapshot> {
    let token = stored_token(config)?;
    Ok(orchestrator.load(&token).await?)
}

fn print_snapshot(snapshot: &SessionSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    zkvote_utils::init_tracing(config.log_format, &config.log_level);

    let session = || SessionOrchestrator::from_config(&config.session);
    match cli.command {
        Command::Serve { .. } => {
            tracing::info!(listen = %config.service.listen_addr, "starting internal API");
            RpcServer::new(config.service.clone()).start().await?;
        }
        Command::Login => {
            let url = session()?.start_login().await?;
            println!("{url}");
        }
        Command::Callback { id_token, url } => {
            let token = match (id_token, url) {
                (Some(token), _) => token,
                (None, Some(url)) => zkvote_identity::token_from_callback(&url)?,
                (None, None) => anyhow::bail!("pass --id-token or --url"),
            };
            let snapshot = session()?.load(&token).await?;
            print_snapshot(&snapshot)?;
        }
        Command::Status => {
            let snapshot = resume(&session()?, &config).await?;
            print_snapshot(&snapshot)?;
        }
        Command::Mint => {
            let orchestrator = session()?;
            resume(&orchestrator, &config).await?;
            let digest = orchestrator.mint().await?;
            println!("{}", config.session.network.explorer_url(digest.as_str()));
        }
        Command::Vote { candidate } => {
            let orchestrator = session()?;
            resume(&orchestrator, &config).await?;
            let digest = orchestrator.vote(candidate).await?;
            println!("{}", config.session.network.explorer_url(digest.as_str()));
        }
        Command::Logout => {
            session()?.logout()?;
            tracing::info!("session cleared");
        }
    }

    Ok(())
}
