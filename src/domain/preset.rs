//! Preset - Reusable Download Configuration

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PRESET_NAME;

/// A named bundle of download options
///
/// Name uniqueness and the single-default rule are left to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Preset {
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Folder, relative to the download path
    pub folder: String,
    /// Output filename template
    pub template: String,
    /// Netscape-format cookies
    pub cookies: String,
    /// Extra command line options passed to the downloader
    pub cli: String,
    /// Marks the intended default preset
    pub default: bool,
    /// Sort priority, higher first
    pub priority: i64,
}

impl Preset {
    /// Create an otherwise empty preset with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The preset every fresh store starts with
    pub fn default_preset() -> Self {
        Self {
            name: DEFAULT_PRESET_NAME.to_string(),
            description: "Default download options".to_string(),
            default: true,
            ..Self::default()
        }
    }

    /// Whether any download option is set
    pub fn has_options(&self) -> bool {
        !(self.folder.is_empty()
            && self.template.is_empty()
            && self.cookies.is_empty()
            && self.cli.is_empty())
    }
}
