//! shielded-query
//!
//! Reads an ERC-20 balance through a shielded (encrypted) `eth_call`.
//!
//! ```text
//!   config.toml ──┐
//!   CLI flags ────┼─▶ QueryConfig ─▶ ShieldedQuery ──encrypt──▶ node key
//!   env key ──────┘        │               │
//!                          ▼               ├──eth_call (encrypted)──▶ node
//!                        Wallet ───────────┘               │
//!                                          ◀──decrypt──────┘
//!                                          ─▶ "Total Balance is: N Token"
//! ```
//!
//! Exit status is 0 on success and 1 on any failure; errors are logged to
//! stderr and nothing is printed to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};

use shielded_query::blockchain::{NodeClient, Wallet, WalletError};
use shielded_query::config::{load_config, validate_config, ConfigError, QueryConfig};
use shielded_query::observability::init_logging;
use shielded_query::shielded::{QueryError, ShieldedQuery, TokenBalance};

#[derive(Parser)]
#[command(name = "shielded-query")]
#[command(about = "Query token balances through encrypted eth_call", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node JSON-RPC URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Chain ID written into the call (overrides config)
    #[arg(long)]
    chain_id: Option<u64>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token balance of the caller (or --account)
    BalanceOf {
        /// Token contract address (defaults to token.contract_address)
        #[arg(long)]
        contract: Option<String>,

        /// Account to query; also the caller when no private key is set
        #[arg(long)]
        account: Option<String>,

        /// Token decimals (defaults to token.decimals)
        #[arg(long)]
        decimals: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.observability.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_logging(&log_level);

    tracing::info!("shielded-query v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result.and_then(|balance| balance.formatted().map_err(QueryError::from)) {
        Ok(units) => {
            println!("Total Balance is: {} Token", units);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching balance");
            ExitCode::FAILURE
        }
    }
}

/// Config file (or defaults) with CLI overrides applied, then validated.
fn resolve_config(cli: &Cli) -> Result<QueryConfig, QueryError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => QueryConfig::default(),
    };

    if let Some(rpc_url) = &cli.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(chain_id) = cli.chain_id {
        config.network.chain_id = chain_id;
    }
    let Commands::BalanceOf { decimals, .. } = &cli.command;
    if let Some(decimals) = decimals {
        config.token.decimals = *decimals;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn run(command: Commands, config: QueryConfig) -> Result<TokenBalance, QueryError> {
    match command {
        Commands::BalanceOf { contract, account, .. } => {
            let contract =
                parse_address(&contract.unwrap_or_else(|| config.token.contract_address.clone()))?;
            let account = account.as_deref().map(parse_address).transpose()?;
            let decimals = config.token.decimals;

            let wallet = match (Wallet::from_env(), account) {
                (Ok(wallet), _) => wallet,
                (Err(WalletError::MissingEnv(_)), Some(address)) => Wallet::watch_only(address),
                (Err(e), _) => return Err(e.into()),
            };
            let wallet = wallet.connect(NodeClient::from_config(&config.network)?);

            tracing::info!(
                contract = %contract,
                rpc_url = %config.network.rpc_url,
                chain_id = config.network.chain_id,
                "Configuration loaded"
            );

            let query = ShieldedQuery::new(config.network)?;
            query
                .balance_of(
                    &wallet,
                    contract,
                    account.unwrap_or_else(|| wallet.address()),
                    decimals,
                )
                .await
        }
    }
}

fn parse_address(value: &str) -> Result<Address, QueryError> {
    value
        .parse()
        .map_err(|_| QueryError::InvalidAddress(value.to_string()))
}
