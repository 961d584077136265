use anyhow::Result;
use clap::Parser;

use crate::config::SiteConfig;

/// List every tag the renderer understands.
#[derive(Parser, Debug)]
#[command(name = "tags")]
pub struct TagsCommand {}

impl TagsCommand {
    pub fn execute(&self, config: &SiteConfig) -> Result<()> {
        for tag in config.parser().renderer().available_tags() {
            println!("[{tag}]");
        }
        Ok(())
    }
}
