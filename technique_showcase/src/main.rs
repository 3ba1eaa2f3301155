//! technique_showcase — interactive entry point.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use technique_showcase::app::{run, run_headless};
use technique_showcase::config::{Cli, Settings};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    settings.apply_env().context("reading SHOWCASE_* environment")?;
    cli.apply(&mut settings);

    init_tracing(&settings.log_filter);

    if let Some(seconds) = cli.headless {
        let transcript = run_headless(&settings, seconds.saturating_mul(1000))
            .context("headless run failed")?;
        for line in transcript {
            println!("{line}");
        }
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Technique Showcase                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &settings.feed {
        Some(path) => println!("  Gestures: replaying {}", path.display()),
        None       => println!("  Gestures: off  (use --feed FILE to replay landmarks)"),
    }
    println!("  Keys: 1-5 cast  R random  A auto-cast  B blindfold  Q quit");
    println!();

    run(&settings).context("showcase exited with an error")
}

/// `RUST_LOG` wins; otherwise the configured filter.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
