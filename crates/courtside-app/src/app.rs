// One render pass: load -> derive -> render -> write.

use crate::config::Config;
use crate::loader::{self, ResourceFetcher};
use crate::render::{self, PageOptions};
use anyhow::Context;
use courtside_core::derive::derive;
use courtside_core::filter::TeamFilter;
use courtside_core::query::{query_param, TEAMS_PARAM};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Load both datasets and produce the page HTML without touching disk.
///
/// A failed load aborts the pass; nothing is rendered.
pub async fn render(config: &Config, fetcher: &dyn ResourceFetcher) -> anyhow::Result<String> {
    let snapshot = match loader::load_snapshot(fetcher, &config.data).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("data load failed, nothing rendered: {}", e);
            return Err(anyhow::Error::new(e).context("failed to load data"));
        }
    };

    let teams_param = query_param(&config.page.location, TEAMS_PARAM);
    let filter = TeamFilter::from_param(&teams_param);
    if filter.is_active() {
        info!("filtering columns to teams: {}", filter.teams().join(","));
    }

    let table = derive(&snapshot, &filter, &config.strip);
    let options = PageOptions::from_config(config, &teams_param);
    render::render_page(&table, &snapshot.teams, &options).context("failed to render page")
}

/// Full pass: render and write to `page.output`, resolved against `base_dir`
/// when relative. Returns the written path.
pub async fn run(
    config: &Config,
    fetcher: &dyn ResourceFetcher,
    base_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let html = render(config, fetcher).await?;
    let output = base_dir.join(&config.page.output);
    render::write_page(&output, &html)?;
    Ok(output)
}
