//! Render a stored template.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::CliContext;
use crate::models::RenderData;

/// Render the stored `search` or `single` template and print the HTML.
#[derive(Parser, Debug)]
#[command(name = "render")]
pub struct RenderCommand {
    /// Template to render: `search` or `single`
    template_type: String,

    /// JSON file with the render data; empty data when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Always run the parser, refreshing the cached entry
    #[arg(long)]
    bypass_cache: bool,
}

impl RenderCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let html = self.render(ctx).await?;
        println!("{html}");
        Ok(())
    }

    async fn render(&self, ctx: &CliContext) -> Result<String> {
        let data = match &self.data {
            Some(path) => load_render_data(path).await?,
            None => RenderData::default(),
        };

        let engine = ctx.engine();
        let html = engine.render(&self.template_type, &data, self.bypass_cache)?;

        let stats = engine.stats();
        tracing::debug!("Render finished: {} hit(s), {} miss(es)", stats.hits, stats.misses);
        Ok(html)
    }
}

async fn load_render_data(path: &Path) -> Result<RenderData> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read render data from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse render data from {}", path.display()))
}
