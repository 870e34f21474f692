//! Configuration management for Wayview
//!
//! This module handles loading, parsing, and validating the view core's
//! configuration from TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreError;

/// Largest accepted `[interaction]` minimum width or height
pub const MAX_MIN_SIZE: u32 = 16384;

/// Main configuration struct containing all core settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoreConfig {
    /// Damage accumulation settings
    #[serde(default)]
    pub damage: DamageConfig,

    /// Geometry/serial handshake settings
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Interactive move/resize settings
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Per-output damage accumulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DamageConfig {
    /// Rectangles an output may accumulate before it is coalesced to full damage
    pub max_rects_per_output: usize,

    /// Merge overlapping/adjacent rectangles when the repaint driver drains
    pub merge_on_drain: bool,
}

/// Geometry acknowledgement handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Also notify the policy engine when a commit only moved the view
    pub notify_on_position_change: bool,
}

/// Interactive move/resize
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Smallest width an interactive resize may request (pixels)
    pub min_width: u32,

    /// Smallest height an interactive resize may request (pixels)
    pub min_height: u32,

    /// Focus and raise the view under the pointer on button press
    pub focus_on_click: bool,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            max_rects_per_output: 16,
            merge_on_drain: true,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_width: 1,
            min_height: 1,
            focus_on_click: true,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let relative = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(relative)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: CoreConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), CoreError> {
        if self.damage.max_rects_per_output == 0 {
            return Err(CoreError::invalid_config(
                "damage.max_rects_per_output must be at least 1",
            ));
        }

        if self.interaction.min_width == 0 || self.interaction.min_height == 0 {
            return Err(CoreError::invalid_config(
                "interaction.min_width and interaction.min_height must be at least 1",
            ));
        }

        if self.interaction.min_width > MAX_MIN_SIZE
            || self.interaction.min_height > MAX_MIN_SIZE
        {
            return Err(CoreError::invalid_config(format!(
                "interaction.min_width and interaction.min_height must be at most {}",
                MAX_MIN_SIZE
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}


#[cfg(test)]
mod property_tests;
