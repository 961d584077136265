use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::CliContext;
use crate::upgrade::TemplateMigrator;

/// Restore templates from the backups written by `migrate`.
#[derive(Parser, Debug)]
#[command(name = "restore")]
pub struct RestoreCommand {}

impl RestoreCommand {
    pub fn execute(self, ctx: &CliContext) -> Result<()> {
        let engine = ctx.engine();
        let restored = TemplateMigrator::new(&engine).restore_backups()?;
        for template_type in restored {
            println!("✅ {}", format!("Restored {template_type} template from backup").green());
        }
        Ok(())
    }
}
