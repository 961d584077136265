//! Command-line interface for the sermon template engine.
//!
//! The binary works against a JSON state file (see [`FileStore`]) that plays
//! the role of the site's options store and render cache, so templates,
//! backups and cached renders persist between invocations.
//!
//! # Commands
//!
//! ```bash
//! sermon-templates render single --data sermon.json   # render the stored template
//! sermon-templates migrate --dry-run                   # list unknown tags
//! sermon-templates migrate                             # back up, audit, clean up
//! sermon-templates restore                             # put migration backups back
//! sermon-templates cache clear                         # drop cached renders
//! sermon-templates template show search
//! sermon-templates template set single single.html
//! sermon-templates tags                                # print the tag catalogue
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging on stderr
//! - `--quiet` / `-q`: errors only
//! - `--config` / `-c`: configuration file (also `SERMON_TEMPLATES_CONFIG`)
//!
//! `RUST_LOG` takes precedence over both logging flags when set.

mod cache;
mod migrate;
mod render;
mod restore;
mod tags;
mod template;

pub use cache::CacheCommand;
pub use migrate::MigrateCommand;
pub use render::RenderCommand;
pub use restore::RestoreCommand;
pub use tags::TagsCommand;
pub use template::TemplateCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::SiteConfig;
use crate::constants::CONFIG_PATH_ENV;
use crate::store::FileStore;
use crate::templating::TemplateEngine;

/// Main CLI application structure.
#[derive(Parser, Debug)]
#[command(
    name = "sermon-templates",
    about = "Render and maintain sermon page templates",
    version,
    long_about = "Renders sermon records through author-editable tag templates, \
                  manages the render cache and migrates templates written for older engines."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a stored template with data from a JSON file
    Render(RenderCommand),

    /// Back up the stored templates, report unknown tags and drop legacy output
    Migrate(MigrateCommand),

    /// Restore templates from the migration backups
    Restore(RestoreCommand),

    /// Manage the render cache
    Cache(CacheCommand),

    /// Show or replace a stored template
    Template(TemplateCommand),

    /// List every tag the renderer understands
    Tags(TagsCommand),
}

/// Configuration and state shared by the commands of one invocation.
#[derive(Debug)]
pub struct CliContext {
    pub config: SiteConfig,
    pub store: Arc<FileStore>,
}

impl CliContext {
    /// Load the configuration and the state file it points to.
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => SiteConfig::default_path()?,
        };
        let config = SiteConfig::load_with_optional(Some(config_path.clone())).await?;
        let store = FileStore::load(&config.state_path(&config_path)).await?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    /// An engine over this context's store.
    #[must_use]
    pub fn engine(&self) -> TemplateEngine {
        TemplateEngine::new(self.config.parser(), self.store.clone(), self.store.clone())
            .with_ttl(self.config.cache_ttl())
    }

    /// Write the state file back.
    pub async fn persist(&self) -> Result<()> {
        self.store.save().await
    }
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        if let Commands::Tags(cmd) = &self.command {
            return cmd.execute(&self.config_or_default().await?);
        }

        let ctx = CliContext::load(self.config).await?;
        match self.command {
            Commands::Render(cmd) => cmd.execute(&ctx).await?,
            Commands::Migrate(cmd) => cmd.execute(&ctx)?,
            Commands::Restore(cmd) => cmd.execute(&ctx)?,
            Commands::Cache(cmd) => cmd.execute(&ctx)?,
            Commands::Template(cmd) => cmd.execute(&ctx).await?,
            Commands::Tags(_) => {}
        }
        ctx.persist().await
    }

    async fn config_or_default(&self) -> Result<SiteConfig> {
        SiteConfig::load_with_optional(self.config.clone()).await
    }
}

/// Install the stderr log subscriber. Stdout is reserved for command output.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = if verbose {
            "debug"
        } else if quiet {
            "error"
        } else {
            "warn"
        };
        EnvFilter::new(format!("sermon_templates={level}"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
