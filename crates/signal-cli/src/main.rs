//! Command-line interface for signal analysis

mod render;
mod store;

use anyhow::Context;
use clap::{Parser, Subcommand};
use signal_engine::{
    AnalysisService, EngineConfig, IndicatorSnapshot, Interval, ScreeningParams, TradingMode,
};
use signal_llm::{CommentaryPrompt, Language};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::store::{JsonDataStore, load_series};

#[derive(Parser, Debug)]
#[command(name = "signal")]
#[command(about = "Technical analysis, confluence and BPJS screening over JSON bar files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute every indicator for one bar file
    Indicators {
        #[arg(short, long)]
        file: PathBuf,
        /// Defaults to the file name
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short, long, default_value = "1d")]
        interval: Interval,
    },
    /// Multi-timeframe confluence and trade recommendation
    Analyze {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "swing")]
        mode: TradingMode,
        #[arg(short, long, default_value = ".")]
        data_dir: PathBuf,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score and rank symbols for a BPJS trade
    Screen {
        #[arg(short, long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,
        #[arg(short, long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Render the commentary prompt for an analysis
    Prompt {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "swing")]
        mode: TradingMode,
        #[arg(short, long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long, default_value = "en")]
        lang: Language,
    },
}

fn service(data_dir: &Path, config: EngineConfig) -> anyhow::Result<AnalysisService> {
    let store = Arc::new(JsonDataStore::new(data_dir));
    Ok(AnalysisService::new(config, store.clone(), store)?)
}

fn screening_config(min_score: Option<f64>, limit: Option<usize>) -> anyhow::Result<EngineConfig> {
    let defaults = ScreeningParams::default();
    let config = EngineConfig::builder()
        .screening(
            min_score.unwrap_or(defaults.min_score),
            limit.unwrap_or(defaults.max_results),
        )
        .build()?;
    Ok(config)
}

async fn indicators(file: &Path, symbol: Option<String>, interval: Interval) -> anyhow::Result<()> {
    let symbol = symbol
        .or_else(|| file.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .context("cannot derive a symbol from the file name; pass --symbol")?;
    let series = load_series(file, &symbol, interval)
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;
    let snapshot = IndicatorSnapshot::compute(&series, &EngineConfig::default().indicators)?;

    println!("{} {} ({} bars)", snapshot.symbol, snapshot.interval, series.len());
    println!("{}", render::snapshot_table(&snapshot));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = signal_utils::Config::from_env();
    signal_utils::init_tracing_with(app.log_format);

    let cli = Cli::parse();
    info!(app = %app.app_name, environment = %app.environment, "starting");

    match cli.command {
        Commands::Indicators {
            file,
            symbol,
            interval,
        } => indicators(&file, symbol, interval).await,
        Commands::Analyze {
            symbol,
            mode,
            data_dir,
            json,
        } => {
            let result = service(&data_dir, EngineConfig::default())?
                .analyze(&symbol, mode)
                .await
                .with_context(|| format!("analysis of {symbol} failed"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render::timeframes_table(&result));
                println!("{}", render::recommendation_summary(&result));
            }
            Ok(())
        }
        Commands::Screen {
            symbols,
            data_dir,
            min_score,
            limit,
            json,
        } => {
            let scores = service(&data_dir, screening_config(min_score, limit)?)?
                .screen(symbols.as_slice())
                .await
                .context("screening failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else if scores.is_empty() {
                println!("No symbol reached the minimum score");
            } else {
                println!("{}", render::scores_table(&scores));
            }
            Ok(())
        }
        Commands::Prompt {
            symbol,
            mode,
            data_dir,
            lang,
        } => {
            let result = service(&data_dir, EngineConfig::default())?
                .analyze(&symbol, mode)
                .await
                .with_context(|| format!("analysis of {symbol} failed"))?;
            println!("{}", CommentaryPrompt::new()?.confluence(&result, lang)?);
            Ok(())
        }
    }
}
