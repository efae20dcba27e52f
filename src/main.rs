//! `frontier`: reads an analysis request as JSON and writes the report as JSON.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use frontier_rs::AnalysisRequest;
use frontier_rs::AnalyticsError;
use frontier_rs::PortfolioEngine;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "frontier")]
#[command(about = "Efficient frontier, portfolio beta and hedge sizing from price history")]
struct Cli {
  /// Request file; stdin when omitted
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Report file; stdout when omitted
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Seed for the Monte Carlo sampler
  #[arg(long)]
  seed: Option<u64>,

  /// Number of random portfolios
  #[arg(long)]
  random_portfolios: Option<usize>,

  /// Number of target returns on the frontier grid
  #[arg(long)]
  frontier_points: Option<usize>,

  /// Print single-line JSON
  #[arg(long)]
  compact: bool,
}

fn read_request(cli: &Cli) -> anyhow::Result<AnalysisRequest> {
  let raw = match &cli.input {
    Some(path) => {
      fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    }
    None => {
      let mut buf = String::new();
      std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading request from stdin")?;
      buf
    }
  };

  parse_request(&raw, cli)
}

/// Parse `raw` and layer the command-line overrides over its `config`.
fn parse_request(raw: &str, cli: &Cli) -> anyhow::Result<AnalysisRequest> {
  let mut request: AnalysisRequest =
    serde_json::from_str(raw).context("parsing analysis request")?;

  let flags = [
    ("seed", cli.seed.map(Value::from)),
    ("randomPortfolios", cli.random_portfolios.map(Value::from)),
    ("frontierPoints", cli.frontier_points.map(Value::from)),
  ];
  if flags.iter().any(|(_, v)| v.is_some()) {
    let config = request.config.get_or_insert_with(|| json!({}));
    if config.is_null() {
      *config = json!({});
    }
    let fields = config
      .as_object_mut()
      .context("request config must be a JSON object")?;
    for (key, value) in flags {
      if let Some(value) = value {
        fields.insert(key.to_string(), value);
      }
    }
  }

  Ok(request)
}

fn run(cli: &Cli) -> anyhow::Result<String> {
  let request = read_request(cli)?;
  let report = PortfolioEngine::default().analyze(&request)?;

  let out = if cli.compact {
    serde_json::to_string(&report)?
  } else {
    serde_json::to_string_pretty(&report)?
  };
  Ok(out)
}

fn error_kind(err: &anyhow::Error) -> &'static str {
  if let Some(e) = err.downcast_ref::<AnalyticsError>() {
    e.kind()
  } else if err.downcast_ref::<serde_json::Error>().is_some() {
    "ValidationError"
  } else if err.downcast_ref::<std::io::Error>().is_some() {
    "IOError"
  } else {
    "Error"
  }
}

/// `{error, type}` object printed when a run fails.
fn envelope(err: &anyhow::Error) -> Value {
  let message = err
    .downcast_ref::<AnalyticsError>()
    .map(ToString::to_string)
    .unwrap_or_else(|| format!("{err:#}"));
  json!({ "error": message, "type": error_kind(err) })
}

fn write_report(cli: &Cli, report: &str) -> anyhow::Result<()> {
  match &cli.output {
    Some(path) => {
      fs::write(path, report).with_context(|| format!("writing {}", path.display()))?;
      info!(path = %path.display(), "report written");
    }
    None => println!("{report}"),
  }
  Ok(())
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let cli = Cli::parse();
  match run(&cli).and_then(|report| write_report(&cli, &report)) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::error!(error = %format!("{err:#}"), "analysis failed");
      println!("{}", envelope(&err));
      ExitCode::FAILURE
    }
  }
}
