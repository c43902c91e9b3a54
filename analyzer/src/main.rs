// Third party imports
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

// Internal imports
use tokenscan::{AnalysisResult, Analyzer, AppConfig, TokenAnalysis};
use tokenscan_common::{init_logging, parse_token_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about = "Composite trust/risk scoring for crypto tokens", long_about = None)]
struct Cli {
    /// Token addresses, comma separated
    tokens: String,

    /// Config file path (default: ./tokenscan.toml if present)
    #[arg(short, long, env = "TOKENSCAN_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn render_result(result: &AnalysisResult) -> String {
    let s = &result.subscores;
    let mut out = format!(
        "{} {} [{}]\n  {} ({}) - total {}/100\n  security {} | activity {} | trend {} | hype {}\n  AI: hype {} / probability {}% - {}\n",
        result.verdict.to_emoji(),
        result.snapshot.display_name(),
        result.token_address,
        result.verdict,
        result.verdict.to_description(),
        result.total_score,
        s.security,
        s.activity,
        s.trend,
        s.hype,
        result.hype.hype_score,
        result.hype.probability,
        result.hype.summary,
    );
    for note in &result.notes {
        out.push_str(&format!("  note: {}\n", note));
    }
    out
}

fn render_text(outcomes: &[TokenAnalysis]) -> String {
    outcomes
        .iter()
        .map(|outcome| match outcome {
            TokenAnalysis::Analyzed(result) => render_result(result),
            TokenAnalysis::Failed {
                token_address, message, ..
            } => format!("⚠️ {}\n  {}\n", token_address, message),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Không thể tải cấu hình")?;
    let _log_guard = init_logging(&config.logging)?;

    let tokens = parse_token_list(&cli.tokens, config.max_tokens_per_request);
    if tokens.is_empty() {
        bail!("No token address given");
    }
    info!("Phân tích {} token (tối đa {})", tokens.len(), config.max_tokens_per_request);

    let analyzer = Analyzer::from_config(&config)?;
    let outcomes = analyzer.analyze_many(&tokens).await;

    for outcome in &outcomes {
        if let TokenAnalysis::Failed { token_address, message, .. } = outcome {
            error!("Không phân tích được token {}: {}", token_address, message);
        }
    }

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcomes).context("Failed to serialize results")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", render_text(&outcomes)),
    }

    Ok(())
}
