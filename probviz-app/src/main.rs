//! probviz
//!
//! Opens the interactive explorer, or prints one view's data as JSON with
//! `--dump`.

mod config;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let explorer = config.explorer()?;

    if config.dump {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.log_filter.as_str().into()),
            )
            .init();

        info!(
            view = %explorer.view,
            distribution = %explorer.selected.name(),
            method = %explorer.method,
            seed = explorer.seed,
            "dumping snapshot"
        );
        let snapshot = explorer.snapshot(explorer.view);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    // Bevy installs its own subscriber from the log plugin
    let window = config.window()?;
    let exit = probviz::runtime::run_explorer(explorer, window);
    if exit.is_error() {
        anyhow::bail!("explorer exited with {exit:?}");
    }
    Ok(())
}
