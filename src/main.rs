use clap::{Parser, Subcommand};
use fair_tally::config::Config;
use fair_tally::db::Database;
use fair_tally::error::FairError;
use fair_tally::export::PollExport;
use fair_tally::results::PollResults;
use fair_tally::source::load_results;
use fair_tally::tasks::results_watcher::watch_results;
use fair_tally::tiebreak::tied_at_cutoff;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "fair", about = "Tally and verify FAIR hackathon polls")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List polls in the store.
    Polls,
    /// Compute results for a stored poll.
    Results {
        poll_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Recompute results from an export file without touching the store.
    Verify {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Recompute a poll's results on an interval.
    Watch {
        poll_id: String,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Write a poll's config, teams and votes to a JSON file.
    Export { poll_id: String, out: PathBuf },
    /// Load an export file into the store.
    Import { path: PathBuf },
    /// Show teams tied at a prize cutoff.
    Ties { poll_id: String, cutoff: usize },
    /// Record the chain reference for an anchored vote.
    Anchor { vote_id: String, tx_hash: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load();

    if let Err(e) = run(cli.command, &config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<(), FairError> {
    let explorer = config.explorer();

    match command {
        // Offline verification never opens the store
        Command::Verify { path, json } => {
            let export = PollExport::read_from(&path)?;
            print_results(&export.verify(&explorer), json)?;
        }
        Command::Polls => {
            let database = open_store(config).await?;
            for poll in database.list_polls().await? {
                println!(
                    "{}\t{}\t{} teams\t{} votes",
                    poll.id, poll.voting_mode, poll.team_count, poll.vote_count
                );
            }
        }
        Command::Results { poll_id, json } => {
            let database = open_store(config).await?;
            let results = load_results(database.as_ref(), &poll_id, &explorer).await?;
            print_results(&results, json)?;
        }
        Command::Watch { poll_id, interval_secs } => {
            let database = open_store(config).await?;
            let period = interval_secs
                .map(Duration::from_secs)
                .unwrap_or(config.watch_interval);
            watch_results(database, poll_id, explorer, period, None).await;
        }
        Command::Export { poll_id, out } => {
            let database = open_store(config).await?;
            PollExport::from_db(&database, &poll_id).await?.write_to(&out)?;
        }
        Command::Import { path } => {
            let database = open_store(config).await?;
            PollExport::read_from(&path)?.import_into(&database).await?;
        }
        Command::Ties { poll_id, cutoff } => {
            let database = open_store(config).await?;
            let results = load_results(database.as_ref(), &poll_id, &explorer).await?;
            let report = tied_at_cutoff(&results.team_results(), cutoff);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.needs_tie_breaker() {
                warn!(
                    "Poll {}: {} teams tied across the top-{} cutoff",
                    poll_id,
                    report.tied_team_ids.len(),
                    cutoff
                );
            }
        }
        Command::Anchor { vote_id, tx_hash } => {
            let database = open_store(config).await?;
            if !fair_tally::anchor::is_tx_hash(&tx_hash) {
                warn!("{} does not look like a transaction hash", tx_hash);
            }
            if database.attach_tx_hash(&vote_id, &tx_hash).await? {
                info!("Attached {} to vote {}", tx_hash, vote_id);
            } else {
                warn!("Vote {} not found or already anchored", vote_id);
            }
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<Database>, FairError> {
    Ok(Arc::new(Database::connect(&config.database_url).await?))
}

fn print_results(results: &PollResults, json: bool) -> Result<(), FairError> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        println!("{}", results.summary());
    }
    Ok(())
}
