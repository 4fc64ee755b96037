use std::process;

use anyhow::Result;
use clap::Parser;
use kubegone::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_log::LogTracer::init()?;
  let subscriber = tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_max_level(cli.verbose.tracing_level_filter())
    .with_target(false)
    .finish();
  tracing::subscriber::set_global_default(subscriber)?;

  match &cli.commands {
    Commands::Detect(args) => {
      let results = kubegone::run(args).await?;

      if args.error_on_deleted && !results.is_empty() {
        process::exit(2);
      }
    }
  }

  Ok(())
}
