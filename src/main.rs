use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use insight_engine::application::collect_insights;
use insight_engine::application::ReportHandoff;
use insight_engine::infrastructure::config::{ConfigService, DEFAULT_CONFIG_FILE};
use insight_engine::infrastructure::llm_clients::summarizer_for;
use insight_engine::{InsightPipeline, JsonSeriesRenderer, Result};

#[derive(Debug, Parser)]
#[command(name = "insight-engine", about = "Clean a track dataset and compute report statistics")]
struct Args {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Raw CSV dataset, overrides the configured input path
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory, overrides the configured one
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Entities kept in the top-N chart
    #[arg(long)]
    top_n: Option<usize>,

    /// Do not call the summarizer even when a key is configured
    #[arg(long)]
    skip_insights: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if let Err(e) = run(Args::parse()).await {
        error!("Pipeline failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = ConfigService::with_file(&args.config).load()?;
    if let Some(input) = args.input {
        config.input_path = input;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }

    info!("=== Automated Insight Engine ===");

    let pipeline = InsightPipeline::new(config);
    let renderer = JsonSeriesRenderer::new(pipeline.layout().clone());
    let (report, analysis) = pipeline.run(&renderer)?;

    info!(
        "Clean table: {} ({} of {} rows, {})",
        report.clean_path.display(),
        report.clean_rows,
        report.raw_rows,
        report.encoding
    );
    for (key, metric) in analysis.metrics.iter() {
        info!("{}: {}", key, metric);
    }

    let insights = if args.skip_insights {
        Default::default()
    } else {
        let summarizer = summarizer_for(&pipeline.config().summarizer);
        collect_insights(summarizer.as_ref(), &analysis.images).await
    };

    ReportHandoff::new(&analysis, insights).write(pipeline.layout())?;

    info!(
        "=== Pipeline finished. Check {} ===",
        pipeline.layout().root().display()
    );
    Ok(())
}
