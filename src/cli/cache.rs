use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use super::CliContext;
use crate::constants::CACHE_KEY_PREFIX;
use crate::store::CacheStore;

/// Manage the render cache.
#[derive(Parser, Debug)]
#[command(name = "cache")]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommand {
    /// Remove every cached render
    Clear,
    /// Show the number of cached renders
    Info,
}

impl CacheCommand {
    pub fn execute(self, ctx: &CliContext) -> Result<()> {
        let engine = ctx.engine();
        match self.command {
            CacheSubcommand::Clear => {
                let removed = engine.clear_cache();
                println!("✅ {}", format!("Removed {removed} cached render(s)").green());
            }
            CacheSubcommand::Info => {
                println!("State file: {}", ctx.store.path().display());
                println!("Cached renders: {}", cached_renders(ctx));
            }
        }
        Ok(())
    }
}

fn cached_renders(ctx: &CliContext) -> usize {
    ctx.store.keys_with_prefix(CACHE_KEY_PREFIX).len()
}
