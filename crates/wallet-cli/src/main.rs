//! Interactive wallet shell running against the in-process devnet.
//!
//! ```text
//! wallet --config wallet.toml --network 11155111
//! ```

mod config;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use credential_store::{CredentialStore, EncryptedFileStore, MemoryStore};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet_core::{DevnetFacade, NetworkRegistry, WalletSession};

use crate::config::CliConfig;

const PASSPHRASE_PROMPT: &str =
    "store passphrase (shown as typed, set WALLET_PASSPHRASE to hide it): ";

#[derive(Parser)]
#[command(name = "wallet")]
#[command(about = "Multi-chain wallet shell (EVM and Substrate)", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Encrypted credential store file [default: <data dir>/wallet/store.json]
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Keep credentials in memory only
    #[arg(long, conflicts_with = "store")]
    ephemeral: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Network to connect to after start-up
    #[arg(short, long)]
    network: Option<String>,

    /// Store passphrase. When unset it is read from stdin, which echoes it
    #[arg(long, env = "WALLET_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let registry: Arc<dyn NetworkRegistry> = Arc::new(config.registry()?);
    let mut input = BufReader::new(tokio::io::stdin());
    let store: Arc<dyn CredentialStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let path = config.resolve_store_path(cli.store.clone());
        let passphrase = match cli.passphrase.clone() {
            Some(passphrase) => SecretString::from(passphrase),
            None => prompt_passphrase(&mut input).await?,
        };
        tracing::info!(path = %path.display(), "opening credential store");
        Arc::new(EncryptedFileStore::open(path, &passphrase).await?)
    };

    let facade = Arc::new(DevnetFacade::new(
        registry.clone(),
        config.devnet.to_devnet_config(),
    ));
    let session = WalletSession::new(facade, store, registry);

    session.initialize().await?;
    if let Some(warning) = session.state().error {
        eprintln!("warning: {warning}");
    }

    let startup_network = cli.network.clone().or_else(|| config.default_network.clone());
    if let Some(chain_id) = startup_network {
        if let Err(e) = session.connect_to_network(&chain_id).await {
            eprintln!("error: {e}");
        }
    }

    println!("{}", repl::render_status(&session.state()));
    println!("type 'help' for commands");
    repl::run(&session, input, tokio::io::stdout()).await?;
    Ok(())
}

async fn prompt_passphrase(input: &mut BufReader<Stdin>) -> std::io::Result<SecretString> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(PASSPHRASE_PROMPT.as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}
