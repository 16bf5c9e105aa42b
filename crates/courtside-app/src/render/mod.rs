// Presentation layer: turns a derived stat table into a self-contained HTML
// page.

pub mod color;
pub mod html;

use crate::config::Config;
use anyhow::Context;
use chrono::{DateTime, Utc};
use color::ColorRamp;
use courtside_core::distribution::StripLayout;
use std::path::Path;
use tracing::info;

pub use html::render_page;

/// Everything the renderer needs besides the table itself, built once per
/// render pass.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    pub stats_base_url: String,
    /// Current `teams` parameter value, echoed into the filter form.
    pub teams_param: String,
    pub layout: StripLayout,
    pub ramp: ColorRamp,
    pub generated_at: DateTime<Utc>,
}

impl PageOptions {
    pub fn from_config(config: &Config, teams_param: &str) -> Self {
        Self {
            title: config.page.title.clone(),
            stats_base_url: config.page.stats_base_url.clone(),
            teams_param: teams_param.to_string(),
            layout: config.strip,
            ramp: ColorRamp::from_config(&config.color),
            generated_at: Utc::now(),
        }
    }
}

/// Write the page, creating parent directories as needed.
pub fn write_page(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {} bytes to {}", html.len(), path.display());
    Ok(())
}
