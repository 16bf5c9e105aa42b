// courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config
// 3. Fetch team metadata and combined stats concurrently
// 4. Derive the table and render the page
// 5. Write the page to `page.output`

use courtside_app::app;
use courtside_app::config;
use courtside_app::loader::DefaultFetcher;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("courtside starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: teams={}, stats={}, location={}",
        config.data.teams, config.data.stats, config.page.location
    );

    // 3-5. Load, derive, render, write
    let cwd = std::env::current_dir()?;
    let fetcher = DefaultFetcher::new();
    let output = app::run(&config, &fetcher, &cwd).await?;

    info!("page written to {}", output.display());
    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    EnvFilter::new("courtside=info,courtside_app=info,courtside_core=info,warn")
                }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
