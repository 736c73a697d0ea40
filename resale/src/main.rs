use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod clean;
mod merge;
mod outliers;

use outliers::Numeric;

#[derive(Debug, Parser)]
#[command(name = "resale")]
#[command(about = "Clean resale transaction extracts and merge engineered features")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a raw resale extract
    Clean {
        raw: PathBuf,
        output: PathBuf,
        /// Numeric columns to trim with the IQR rule
        #[arg(long, value_enum)]
        trim: Vec<Numeric>,
    },
    /// Join engineered features onto a cleaned table
    Finalize {
        clean: PathBuf,
        features: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Clean { raw, output, trim } => clean::run(&raw, &output, &trim)?,
        Command::Finalize {
            clean,
            features,
            output,
        } => merge::run(&clean, &features, &output)?,
    }

    Ok(())
}
