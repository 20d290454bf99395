//! Optional `cubesym.toml` holding defaults for `generate`.
//!
//! ```toml
//! layout = "both"
//! short_pins = false
//! group_prefix_len = 7
//! pattern = "STM32*.xml"
//! ```
//!
//! Every key is optional; flags given on the command line win.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cubesym_symbol::{LayoutSelection, PinLabels};
use serde::Deserialize;

pub const DEFAULT_PATTERN: &str = "STM32*.xml";
pub const DEFAULT_GROUP_PREFIX_LEN: usize = 7;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub layout: Option<LayoutSelection>,
    pub short_pins: Option<bool>,
    pub group_prefix_len: Option<usize>,
    pub pattern: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Settings of one `generate` run after merging flags over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSettings {
    pub layout: LayoutSelection,
    pub collect_signals: bool,
    pub group_prefix_len: usize,
    pub pattern: String,
}

impl GenerateSettings {
    /// Short pins leave out every alternate function, including names merged
    /// in from other records at the same position.
    pub fn labels(&self) -> PinLabels {
        if self.collect_signals {
            PinLabels::Full
        } else {
            PinLabels::Short
        }
    }

    pub fn resolve(
        file: FileConfig,
        layout: Option<LayoutSelection>,
        short_pins: bool,
        group_prefix_len: Option<usize>,
        pattern: Option<String>,
    ) -> Result<Self> {
        let group_prefix_len = group_prefix_len
            .or(file.group_prefix_len)
            .unwrap_or(DEFAULT_GROUP_PREFIX_LEN);
        if group_prefix_len == 0 {
            anyhow::bail!("group prefix length must be at least 1");
        }

        Ok(Self {
            layout: layout.or(file.layout).unwrap_or_default(),
            collect_signals: !(short_pins || file.short_pins.unwrap_or(false)),
            group_prefix_len,
            pattern: pattern
                .or(file.pattern)
                .unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
        })
    }
}
