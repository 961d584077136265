use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::TemplateError;
use crate::models::TemplateType;
use crate::store::OptionsStore;

/// Manages the migration backup of one stored template.
///
/// The backup lives in the options store next to the template itself:
/// `search_template` is copied to `search_template_backup`, and so on. A
/// backup is written even for an empty template so that a restore always puts
/// back exactly what was there.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sermon_templates::models::TemplateType;
/// use sermon_templates::store::MemoryStore;
/// use sermon_templates::upgrade::backup::TemplateBackup;
///
/// # fn example() -> Result<(), sermon_templates::core::TemplateError> {
/// let backup = TemplateBackup::new(Arc::new(MemoryStore::new()), TemplateType::Search);
/// backup.create_backup()?;
///
/// // ... migrate ...
///
/// if backup.backup_exists() {
///     backup.restore_backup()?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct TemplateBackup {
    options: Arc<dyn OptionsStore>,
    template_type: TemplateType,
    template_option: String,
    backup_option: String,
}

impl TemplateBackup {
    pub fn new(options: Arc<dyn OptionsStore>, template_type: TemplateType) -> Self {
        Self {
            options,
            template_type,
            template_option: template_type.template_option(),
            backup_option: template_type.backup_option(),
        }
    }

    /// Copy the current template text into the backup slot unless a backup
    /// already exists.
    ///
    /// An existing backup holds the text from before the first migration and
    /// is never replaced; later edits are not backups. A missing template is
    /// backed up as empty text. Returns whether a backup was written.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Store`] if the backup cannot be written.
    pub fn create_backup(&self) -> Result<bool, TemplateError> {
        if self.backup_exists() {
            debug!("Keeping existing backup {}", self.backup_option);
            return Ok(false);
        }

        let text = self.options.get_option(&self.template_option).unwrap_or_default();
        info!("Backing up {} template to {}", self.template_type, self.backup_option);
        self.options.set_option(&self.backup_option, &text)?;
        Ok(true)
    }

    /// Copy the backup back over the template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::BackupMissing`] when no backup exists and
    /// [`TemplateError::Store`] if the template cannot be written.
    pub fn restore_backup(&self) -> Result<(), TemplateError> {
        let Some(text) = self.options.get_option(&self.backup_option) else {
            return Err(TemplateError::BackupMissing {
                template_type: self.template_type.to_string(),
            });
        };

        warn!("Restoring {} template from {}", self.template_type, self.backup_option);
        self.options.set_option(&self.template_option, &text)?;
        info!("Restored {} template ({} bytes)", self.template_type, text.len());
        Ok(())
    }

    /// Delete the backup slot if present.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Store`] if the delete fails.
    pub fn cleanup_backup(&self) -> Result<(), TemplateError> {
        if self.options.delete_option(&self.backup_option)? {
            debug!("Removed backup {}", self.backup_option);
        }
        Ok(())
    }

    #[must_use]
    pub fn backup_exists(&self) -> bool {
        self.options.get_option(&self.backup_option).is_some()
    }

    /// Option name of the backup slot.
    #[must_use]
    pub fn backup_option(&self) -> &str {
        &self.backup_option
    }
}
