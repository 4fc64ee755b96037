pub mod catalog;
pub mod clients;
pub mod config;
pub mod detect;
pub mod k8s;
pub mod output;

use std::time::Duration;

use anstyle::{AnsiColor, Effects};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, builder::Styles};
use clap_verbosity_flag::Verbosity;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, level_filters::LevelFilter};

use crate::{catalog::KnownApis, clients::RealK8sClients, detect::DeletedApi};

fn styles() -> Styles {
  Styles::styled()
    .header(AnsiColor::Green.on_default() | Effects::BOLD)
    .usage(AnsiColor::Green.on_default() | Effects::BOLD)
    .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
    .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(author, about, version)]
#[command(propagate_version = true, styles = styles())]
pub struct Cli {
  #[command(subcommand)]
  pub commands: Commands,

  #[clap(flatten)]
  pub verbose: Verbosity,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  Detect(Detection),
}

/// Find live objects whose API type is missing from the known API catalog
#[derive(Args, Debug, Serialize, Deserialize)]
pub struct Detection {
  /// Path to the known API catalog (YAML or JSON list/map of `<groupVersion>/<Kind>` keys)
  #[arg(long)]
  pub catalog: Option<String>,

  /// Path to a config file (defaults to `.kubegone.yaml` in the current directory)
  #[arg(long)]
  pub config: Option<String>,

  /// Kubeconfig context to use
  #[arg(long)]
  pub context: Option<String>,

  #[arg(short, long, value_enum, default_value_t)]
  pub format: output::Format,

  /// Write to file instead of stdout
  #[arg(short, long)]
  pub output: Option<String>,

  /// Exit with a non-zero code when deleted APIs are found
  #[arg(long)]
  pub error_on_deleted: bool,
}

/// Runs the detection against the current cluster and writes the report
pub async fn run(args: &Detection) -> Result<Vec<DeletedApi>> {
  let config = config::load(args.config.as_deref())?;
  let catalog_path = args
    .catalog
    .as_deref()
    .or(config.catalog.as_deref())
    .context("A known API catalog is required; pass --catalog or set `catalog` in the config file")?;
  let catalog = KnownApis::load(catalog_path)?;
  info!("Checking cluster resources against {} known APIs", catalog.len());

  let client = RealK8sClients::new(args.context.as_deref()).await?;

  let spinner = scan_spinner(LevelFilter::current());

  let results = detect::detect(&client, &catalog, &config.ignore_groups).await;
  spinner.finish_and_clear();
  let results = results?;

  output::output(&results, &args.format, &args.output)?;

  Ok(results)
}

/// Spinner shown while the cluster is scanned
///
/// Log lines share stderr with the spinner, so it is hidden whenever info or debug output is enabled
fn scan_spinner(level: LevelFilter) -> ProgressBar {
  if level > LevelFilter::WARN {
    return ProgressBar::hidden();
  }

  let spinner = ProgressBar::new_spinner();
  spinner.set_style(ProgressStyle::default_spinner());
  spinner.set_message("Scanning cluster resources");
  spinner.enable_steady_tick(Duration::from_millis(120));
  spinner
}
