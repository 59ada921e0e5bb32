//! acrux-node: drives the Acrux emission schedule over a local state database.
//!
//! Typical flow:
//!   1. `generate-genesis` allocates the supply from a JSON config
//!   2. `init` writes the genesis document into a fresh database
//!   3. `run` replays blocks at a fixed interval through the mint end-blocker
//!   4. `status` / `export` inspect the result

mod chain;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use acrux_core::types::{BlockHeader, Timestamp};
use acrux_genesis::{apply_genesis, GenesisConfig, GenesisDoc};
use acrux_mint::{MintKeeper, MintOutcome};
use acrux_state::StateDb;

const DEFAULT_CHAIN_ID: &str = "acrux_9052-1";

#[derive(Parser, Debug)]
#[command(name = "acrux-node", version, about = "Acrux node: genesis allocation and emission schedule")]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.acrux/data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate the genesis supply and write the genesis document.
    GenerateGenesis {
        /// Genesis config JSON (reserve address, validator addresses, overrides).
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value = DEFAULT_CHAIN_ID)]
        chain_id: String,
        /// Output path; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a genesis document without touching the database.
    ValidateGenesis { genesis: PathBuf },
    /// Apply a genesis document to a fresh database.
    Init {
        #[arg(long)]
        genesis: PathBuf,
    },
    /// Process blocks through the end-of-block hooks.
    Run {
        /// Number of blocks to process.
        #[arg(long, default_value_t = 100)]
        blocks: u64,
        /// Seconds of block time between consecutive blocks.
        #[arg(long, default_value_t = 5)]
        block_interval: Timestamp,
        /// Block time of the first processed block (unix seconds).
        #[arg(long)]
        from_time: Option<Timestamp>,
        /// Wall-clock pause between blocks in milliseconds; 0 replays as fast as possible.
        #[arg(long, default_value_t = 0)]
        tick_ms: u64,
    },
    /// Print the mint genesis section of the current state.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print chain, minter and pool state as JSON.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,acrux=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data_dir = expand_tilde(&args.data_dir);

    match args.command {
        Command::GenerateGenesis { config, chain_id, output } => {
            let json = std::fs::read_to_string(&config)
                .with_context(|| format!("reading genesis config from {}", config.display()))?;
            let config: GenesisConfig =
                serde_json::from_str(&json).context("parsing genesis config JSON")?;
            let doc = GenesisDoc::prepare(&chain_id, &config).context("preparing genesis")?;
            write_output(output.as_deref(), &doc.to_json()?)?;
        }
        Command::ValidateGenesis { genesis } => {
            let doc = read_genesis(&genesis)?;
            doc.validate().context("genesis document is invalid")?;
            info!(
                chain_id = %doc.chain_id,
                accounts = doc.app_state.auth.accounts.len(),
                supply = %doc.app_state.bank.supply,
                "genesis document is valid"
            );
        }
        Command::Init { genesis } => {
            let doc = read_genesis(&genesis)?;
            let mut db = open_db(&data_dir)?;
            apply_genesis(&mut db, &doc).context("applying genesis")?;
            chain::set_last_block(&db, &BlockHeader::new(0, doc.genesis_timestamp()))?;
            db.flush()?;
            info!(data_dir = %data_dir.display(), "database initialized");
        }
        Command::Run { blocks, block_interval, from_time, tick_ms } => {
            if block_interval <= 0 {
                anyhow::bail!("--block-interval must be positive");
            }
            let db = open_db(&data_dir)?;
            run_blocks(&db, blocks, block_interval, from_time, tick_ms).await?;
        }
        Command::Export { output } => {
            let db = open_db(&data_dir)?;
            let keeper = MintKeeper::open(&db)?;
            let state = keeper.export_genesis().context("exporting mint genesis")?;
            write_output(output.as_deref(), &state.to_json()?)?;
        }
        Command::Status => {
            let db = open_db(&data_dir)?;
            let status = chain::status(&db).context("reading node status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

async fn run_blocks(
    db: &StateDb,
    blocks: u64,
    interval: Timestamp,
    mut from_time: Option<Timestamp>,
    tick_ms: u64,
) -> anyhow::Result<()> {
    let mut last = chain::last_block(db)?
        .context("database has no genesis; run `acrux-node init` first")?;
    info!(height = last.height, time = last.time, blocks, "replaying blocks");

    let mut ticker = (tick_ms > 0).then(|| tokio::time::interval(Duration::from_millis(tick_ms)));
    let mut minted_total: u128 = 0;

    for _ in 0..blocks {
        if let Some(ticker) = ticker.as_mut() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupted; stopping after last committed block");
                    break;
                }
            }
        }

        let header = chain::next_header(&last, interval, from_time.take())?;
        match chain::process_block(db, &header)
            .with_context(|| format!("processing block {}", header.height))?
        {
            MintOutcome::Minted { minted, reduced, .. } => {
                minted_total = minted_total.saturating_add(minted);
                if reduced {
                    info!(height = header.height, "emission reduced");
                }
            }
            MintOutcome::PreDistribution => {}
        }
        last = header;
    }

    db.flush()?;
    info!(height = last.height, time = last.time, minted_total, "replay finished");
    Ok(())
}

fn open_db(data_dir: &Path) -> anyhow::Result<StateDb> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    StateDb::open(data_dir).context("opening state database")
}

fn read_genesis(path: &Path) -> anyhow::Result<GenesisDoc> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading genesis document from {}", path.display()))?;
    Ok(GenesisDoc::from_json(&bytes)?)
}

fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, contents).with_context(|| format!("writing {}", p.display()))?;
            info!(path = %p.display(), "written");
        }
        None => println!("{contents}"),
    }
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
