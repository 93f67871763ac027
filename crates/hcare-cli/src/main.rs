//! hcare: Healthcare quality ranking.
//! Entry point for the `hcare` binary: prepare the merged country-year table,
//! score and rank it, write the ranked CSV and print the top-N report.

mod config;
mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hcare_common::Table;
use hcare_ingestion::{read_merged_table, DataPrep};
use hcare_ranker::RankingPipeline;

#[derive(Parser, Debug)]
#[command(name = "hcare")]
#[command(version)]
#[command(about = "Rank countries by a composite healthcare quality score", long_about = None)]
struct Cli {
    /// Configuration file (.toml, .yaml or .json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the IHME and WHO exports
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Already-merged table; skips raw data preparation
    #[arg(long, value_name = "CSV")]
    merged: Option<PathBuf>,

    /// Ranked table destination
    #[arg(short, long, value_name = "CSV")]
    out: Option<PathBuf>,

    /// Rows in the printed report
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Year to report (default: latest)
    #[arg(short, long)]
    year: Option<i32>,

    /// Score years in parallel
    #[arg(long)]
    parallel: bool,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            data_dir: self.data_dir.clone(),
            merged: self.merged.clone(),
            out: self.out.clone(),
            top: self.top,
            parallel: self.parallel,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hcare=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    info!("hcare {}", env!("CARGO_PKG_VERSION"));

    let (mut config, source) = config::load(cli.config.as_deref())?;
    cli.overrides().apply(&mut config);
    config.validate()?;
    info!(source = ?source, parallel = config.execution.parallel, "Configuration loaded");

    let table: Table = match &config.sources.merged_file {
        Some(path) => read_merged_table(path, &config.columns, &config.indicators)?,
        None => {
            let data_dir = config.sources.data_dir.clone();
            DataPrep::new(config.clone()).process(&data_dir)?.merged
        }
    };

    let ranked = RankingPipeline::new(config.indicators.clone())
        .parallel(config.execution.parallel)
        .run(&table)?;

    output::write_scored_csv(&ranked, &config.output.path)?;
    info!(
        path = %config.output.path.display(),
        rows = ranked.len(),
        "Wrote ranked table"
    );

    match cli.year.or_else(|| ranked.latest_year()) {
        Some(year) => print!("{}", output::render_top_n(&ranked, year, config.output.top_n)),
        None => println!("No rows to rank."),
    }

    Ok(())
}
