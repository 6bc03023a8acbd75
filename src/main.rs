use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::Level;

use fco_pipeline::bronze;
use fco_pipeline::config::PipelineConfig;
use fco_pipeline::gold_export;
use fco_pipeline::gold_stats;
use fco_pipeline::http_cache::ConditionalCache;
use fco_pipeline::meta::MetaTables;
use fco_pipeline::nexon_api::{self, NexonClient};
use fco_pipeline::silver;

#[derive(Parser)]
#[command(author, version, about = "FC Online match history pipeline", long_about = None)]
struct Cli {
    /// Override FCO_DATA_ROOT
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download match history for one account into the source folders
    Crawl {
        /// Look the account up by in-game nickname
        #[arg(long, conflicts_with = "ouid")]
        nickname: Option<String>,
        /// Account id; defaults to FCO_TARGET_OUID
        #[arg(long)]
        ouid: Option<String>,
        #[arg(long, default_value_t = 50)]
        match_type: i64,
        /// Stop after this many matches
        #[arg(long)]
        max: Option<usize>,
    },
    /// Download the static metadata tables
    Meta,
    /// Merge dated source folders into bronze
    Sync,
    /// Bronze to silver
    Silver,
    /// Silver to gold
    Gold {
        /// Also write the player and zone tables as an xlsx workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Sync, silver and gold in one go
    All {
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    PipelineConfig::load_dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut config = PipelineConfig::from_env();
    if let Some(root) = cli.data_root {
        config = config.with_data_root(root);
    }

    match cli.command {
        Command::Crawl {
            nickname,
            ouid,
            match_type,
            max,
        } => run_crawl(&config, nickname, ouid, match_type, max),
        Command::Meta => run_meta(&config),
        Command::Sync => run_sync(&config),
        Command::Silver => run_silver(&config),
        Command::Gold { xlsx } => run_gold(&config, xlsx),
        Command::All { xlsx } => {
            run_sync(&config)?;
            run_silver(&config)?;
            run_gold(&config, xlsx)
        }
    }
}

fn run_crawl(
    config: &PipelineConfig,
    nickname: Option<String>,
    ouid: Option<String>,
    match_type: i64,
    max: Option<usize>,
) -> Result<()> {
    let client = NexonClient::new(
        config.require_api_key()?,
        config.request_delay,
        config.max_retries,
    )?;
    let ouid = match (nickname, ouid) {
        (Some(nickname), _) => client
            .get_ouid(&nickname)?
            .ok_or_else(|| anyhow!("no account found for nickname {nickname}"))?,
        (None, Some(ouid)) => ouid,
        (None, None) => config.require_target_ouid()?.to_string(),
    };

    let report = client.crawl_matches(&ouid, match_type, max, &config.source_root)?;
    println!("Crawl complete");
    println!("Matches: {}", report.requested);
    println!("Details: ok={} failed={}", report.succeeded, report.failed);
    println!("Match ids: {}", report.match_ids_file.display());
    println!("Details file: {}", report.detail_file.display());
    Ok(())
}

fn run_meta(config: &PipelineConfig) -> Result<()> {
    let cache = ConditionalCache::open_default();
    let report = nexon_api::crawl_meta(&cache, &config.source_root)?;
    println!("Metadata saved to {}", report.folder.display());
    println!("Tables: {}/{}", report.written.len(), report.written.len() + report.failed.len());
    for kind in &report.failed {
        println!("  failed: {kind}");
    }
    Ok(())
}

fn run_sync(config: &PipelineConfig) -> Result<()> {
    let meta = bronze::sync_meta(&config.source_meta_dir(), &config.bronze_meta_dir())?;
    println!("Metadata source: {}", meta.source.display());
    for kind in &meta.missing {
        println!("  missing: {kind}");
    }

    let bronze_file = config.bronze_match_detail_file();
    let merge = bronze::sync_match_detail(&config.source_match_detail_dir(), &bronze_file)?;
    println!(
        "Bronze: {} matches from {} files ({} replaced, {} malformed, {} without id)",
        merge.merged, merge.files, merge.replaced, merge.skipped, merge.without_id
    );
    println!("  {}", bronze_file.display());
    Ok(())
}

fn run_silver(config: &PipelineConfig) -> Result<()> {
    let target = config.require_target_ouid()?;
    let meta = MetaTables::load_dir(&config.bronze_meta_dir()).context("load metadata")?;
    let bronze_file = config.bronze_match_detail_file();
    if !bronze_file.exists() {
        return Err(anyhow!("bronze file missing: {}", bronze_file.display()));
    }
    let silver_file = config.silver_match_detail_file();
    let report = silver::transform_file(
        &bronze_file,
        &silver_file,
        &meta,
        target,
        config.parallelism,
    )?;
    println!(
        "Silver: {} matches written ({} malformed lines skipped)",
        report.written, report.skipped
    );
    println!("  {}", silver_file.display());
    Ok(())
}

fn run_gold(config: &PipelineConfig, xlsx: Option<PathBuf>) -> Result<()> {
    config.require_target_ouid()?;
    let gold_dir = config.gold_dir();
    let report = gold_stats::write_gold(&config.silver_match_detail_file(), &gold_dir)?;
    println!(
        "Gold: {} summaries from {} matches",
        report.summaries.len(),
        report.matches
    );
    println!(
        "Record: {}W {}D {}L, goals {}:{}",
        report.overall.wins,
        report.overall.draws,
        report.overall.losses,
        report.overall.total_goals_scored,
        report.overall.total_goals_conceded
    );
    for line in &report.concede.analysis {
        println!("  {line}");
    }
    println!("  {}", gold_dir.display());

    if let Some(path) = xlsx {
        let export = gold_export::export_player_workbook(&path, &report.players, &report.zones)?;
        println!(
            "Workbook: {} players, {} zone rows -> {}",
            export.players,
            export.zones,
            path.display()
        );
    }
    Ok(())
}
