//! Migration command for templates written against an older tag catalogue.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use super::CliContext;
use crate::upgrade::{ENGINE_VERSION, TemplateMigrator};

/// Back up the stored templates, report unknown tags and drop legacy output.
#[derive(Parser, Debug)]
#[command(name = "migrate")]
pub struct MigrateCommand {
    /// Report unknown tags without writing anything.
    #[arg(long)]
    dry_run: bool,
}

impl MigrateCommand {
    /// Execute the migrate command.
    ///
    /// Unknown tags are reported as warnings; they do not fail the command.
    pub fn execute(self, ctx: &CliContext) -> Result<()> {
        let engine = ctx.engine();
        let migrator = TemplateMigrator::new(&engine);

        println!("🔍 Checking stored templates in: {}", ctx.store.path().display());

        if self.dry_run {
            let result = migrator.scan();
            println!("{result}");
            println!(
                "\n{} (use without --dry-run to perform migration)",
                "Dry run complete".yellow()
            );
            return Ok(());
        }

        if !migrator.needs_migration() {
            println!(
                "ℹ️  Templates already migrated to engine {ENGINE_VERSION}; re-checking (existing backups are kept)"
            );
        }

        let result = migrator.migrate()?;
        for template_type in result.backed_up() {
            println!("  • {template_type}_template → {}", template_type.backup_option());
        }
        if result.removed_outputs() > 0 {
            println!("  • removed {} legacy output option(s)", result.removed_outputs());
        }
        println!("{result}");

        if result.has_warnings() {
            println!(
                "\n💡 Next steps:\n  • Edit the templates to replace the unknown tags\n  • Run {} to undo the migration",
                "sermon-templates restore".cyan()
            );
        }
        Ok(())
    }
}
