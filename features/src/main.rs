use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use _features::batch::{self, Pacing, Reference};
use _features::nearest::ScanIndex;
use _features::onemap::{Credentials, OneMap, ONEMAP_BASE};
use _features::sink::CsvSink;
use _features::tables::load_places;
use _model::Category;

#[derive(Parser, Debug)]
#[command(name = "features")]
#[command(about = "Engineer proximity features for housing blocks")]
struct Args {
    /// MRT station coordinate table
    #[arg(long, default_value = "datasets/coordinates/MRT_LatLong.csv")]
    mrts: PathBuf,

    /// Mall coordinate table
    #[arg(long, default_value = "datasets/coordinates/Mall_LatLong.csv")]
    malls: PathBuf,

    /// Primary school coordinate table
    #[arg(long, default_value = "datasets/coordinates/School_LatLong.csv")]
    schools: PathBuf,

    /// Housing block coordinate table
    #[arg(long, default_value = "datasets/coordinates/HDB_LatLong.csv")]
    blocks: PathBuf,

    /// Features table, appended to batch by batch
    #[arg(long, default_value = "datasets/HDB_Features.csv")]
    output: PathBuf,

    /// Blocks per routing batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Seconds between the starts of consecutive batches
    #[arg(long, default_value_t = 30)]
    cooldown: u64,

    /// Routing service base URL
    #[arg(long, default_value = ONEMAP_BASE)]
    base_url: String,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    dotenv::dotenv().ok();

    let args = Args::parse();

    let credentials = Credentials::from_env()?;
    let onemap =
        OneMap::authenticate(&args.base_url, &credentials).context("authentication failed")?;
    info!("authenticated with {}", args.base_url);

    let reference = Reference {
        mrts: ScanIndex::new(Category::Mrt, load_places(&args.mrts)?)?,
        malls: ScanIndex::new(Category::Mall, load_places(&args.malls)?)?,
        schools: ScanIndex::new(Category::School, load_places(&args.schools)?)?,
    };
    let blocks = load_places(&args.blocks)?;
    info!("enriching {} blocks", blocks.len());

    let mut sink = CsvSink::create(&args.output)?;
    let pacing = Pacing {
        batch_size: args.batch_size,
        cooldown: Duration::from_secs(args.cooldown),
    };
    let summary = batch::run(&blocks, &reference, &onemap, &mut sink, pacing)?;

    info!(
        "done: {} blocks in {} batches, {} rows missing a walking distance",
        summary.processed, summary.batches, summary.missing_distance
    );

    Ok(())
}
