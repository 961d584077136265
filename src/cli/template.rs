//! Show or replace stored templates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio::fs;

use super::CliContext;
use crate::models::TemplateType;

/// Show or replace a stored template.
#[derive(Parser, Debug)]
#[command(name = "template")]
pub struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplateSubcommand {
    /// Print the stored template text
    Show {
        /// `search` or `single`
        template_type: TemplateType,
    },
    /// Replace the stored template with the contents of a file and clear the cache
    Set {
        /// `search` or `single`
        template_type: TemplateType,
        /// File holding the new template text
        file: PathBuf,
    },
}

impl TemplateCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let engine = ctx.engine();
        match self.command {
            TemplateSubcommand::Show {
                template_type,
            } => {
                println!("{}", engine.template(template_type));
            }
            TemplateSubcommand::Set {
                template_type,
                file,
            } => {
                let text = fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read template from {}", file.display()))?;
                let cleared = engine.save_template(template_type, &text)?;
                println!(
                    "✅ {} ({cleared} cached render(s) cleared)",
                    format!("Saved {template_type} template").green()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_template_from_file() {
        let temp = TempDir::new().unwrap();
        let ctx = CliContext::load(Some(temp.path().join("config.toml"))).await.unwrap();
        let file = temp.path().join("search.html");
        fs::write(&file, "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>")
            .await
            .unwrap();

        TemplateCommand {
            command: TemplateSubcommand::Set {
                template_type: TemplateType::Search,
                file,
            },
        }
        .execute(&ctx)
        .await
        .unwrap();

        assert_eq!(
            ctx.engine().template(TemplateType::Search),
            "<ul>[sermons_loop]<li>[sermon_title]</li>[/sermons_loop]</ul>"
        );
    }

    #[tokio::test]
    async fn test_set_template_missing_file() {
        let temp = TempDir::new().unwrap();
        let ctx = CliContext::load(Some(temp.path().join("config.toml"))).await.unwrap();

        let err = TemplateCommand {
            command: TemplateSubcommand::Set {
                template_type: TemplateType::Single,
                file: temp.path().join("absent.html"),
            },
        }
        .execute(&ctx)
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read template"));
    }
}
