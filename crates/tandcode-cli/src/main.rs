//! Tandcode CLI: treatment-code suggestions from clinical shorthand.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tandcode_ai::{
    CodingPipeline, CodingRequest, CodingResponse, PipelineConfig, Turn, classify_detailed,
};
use tandcode_core::Catalog;
use tandcode_llm::{LlmClient, LlmConfig, StaticGenerator, TextGenerator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod display;

#[derive(Parser)]
#[command(name = "tandcode")]
#[command(version)]
#[command(about = "Suggest dental treatment codes from clinical shorthand", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the code catalog (JSON)
    #[arg(long, global = true, env = "TANDCODE_CATALOG", default_value = "fixtures/catalog.json")]
    catalog: PathBuf,

    /// API key for the language model service
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the language model service
    #[arg(
        long,
        global = true,
        env = "TANDCODE_BASE_URL",
        default_value = "https://api.anthropic.com"
    )]
    base_url: String,

    /// Model identifier
    #[arg(
        long,
        global = true,
        env = "TANDCODE_MODEL",
        default_value = "claude-sonnet-4-5-20250929"
    )]
    model: String,

    /// Timeout for the coding call, in seconds
    #[arg(long, global = true, env = "TANDCODE_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Timeout for the summary call, in seconds
    #[arg(long, global = true, env = "TANDCODE_SUMMARY_TIMEOUT_SECS", default_value_t = 10)]
    summary_timeout_secs: u64,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline against the language model
    Suggest {
        /// The clinician's note, e.g. "comp 36 MOD"
        message: String,

        /// JSON file with earlier turns: [{"role": "...", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,

        /// Teeth selected in the chart, e.g. 36,37
        #[arg(long, value_delimiter = ',')]
        teeth: Vec<u8>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,

        /// Skip the summary call and use the template sentence
        #[arg(long)]
        no_summary: bool,
    },

    /// Run the deterministic stages on a saved model response (no network)
    Replay {
        /// File holding the raw model output
        #[arg(long)]
        llm_output: PathBuf,

        /// The note the output was generated for
        message: String,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which catalog categories a note selects
    Classify {
        message: String,
    },

    /// Summarize the loaded catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Suggest {
            ref message,
            ref history,
            ref teeth,
            json,
            no_summary,
        } => {
            let catalog = load_catalog(&cli.catalog)?;
            let client = LlmClient::new(LlmConfig {
                base_url: cli.base_url.clone(),
                api_key: cli.api_key.clone(),
                model: cli.model.clone(),
                timeout: Duration::from_secs(cli.timeout_secs),
            })
            .context("configuring language model client (set ANTHROPIC_API_KEY)")?;

            let mut request = CodingRequest::new(message.as_str()).with_selected_teeth(teeth);
            if let Some(path) = history {
                request = request.with_history(load_history(path)?);
            }

            let config = PipelineConfig {
                summarize: !no_summary,
                ..pipeline_config(&cli)
            };
            let response = run(catalog, Arc::new(client), config, &request).await?;
            print(&response, json)
        }

        Commands::Replay {
            ref llm_output,
            ref message,
            json,
        } => {
            let catalog = load_catalog(&cli.catalog)?;
            let text = std::fs::read_to_string(llm_output)
                .with_context(|| format!("reading {}", llm_output.display()))?;
            let config = PipelineConfig {
                summarize: false,
                ..pipeline_config(&cli)
            };
            let request = CodingRequest::new(message.as_str());
            let generator = Arc::new(StaticGenerator::new(text));
            let response = run(catalog, generator, config, &request).await?;
            print(&response, json)
        }

        Commands::Classify { ref message } => {
            display::print_selection(&classify_detailed(message));
            Ok(())
        }

        Commands::Catalog => {
            let catalog = load_catalog(&cli.catalog)?;
            display::print_catalog_summary(&catalog.summary());
            Ok(())
        }
    }
}

fn pipeline_config(cli: &Cli) -> PipelineConfig {
    PipelineConfig {
        coding_timeout: Duration::from_secs(cli.timeout_secs),
        summary_timeout: Duration::from_secs(cli.summary_timeout_secs),
        ..PipelineConfig::default()
    }
}

fn load_catalog(path: &Path) -> Result<Arc<Catalog>> {
    let catalog = Catalog::from_path(path)
        .with_context(|| format!("loading catalog from {}", path.display()))?;
    Ok(Arc::new(catalog))
}

fn load_history(path: &Path) -> Result<Vec<Turn>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading history {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing history {}", path.display()))
}

/// Run one request, abandoning it on Ctrl-C.
async fn run(
    catalog: Arc<Catalog>,
    generator: Arc<dyn TextGenerator>,
    config: PipelineConfig,
    request: &CodingRequest,
) -> Result<CodingResponse> {
    let pipeline = CodingPipeline::new(catalog, generator).with_config(config);

    tokio::select! {
        result = pipeline.run(request) => {
            let response = result.context("coding request failed")?;
            info!(suggestions = response.suggestions.len(), "done");
            Ok(response)
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, discarding request");
            bail!("interrupted")
        }
    }
}

fn print(response: &CodingResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        display::print_response(response);
    }
    Ok(())
}
