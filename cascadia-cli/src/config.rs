//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use cascadia_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest 29-bit CAN identifier
const MAX_CAN_ID: u32 = 0x1FFF_FFFF;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// candump log files
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Individual frames in cansend notation
    #[serde(default)]
    pub frames: Vec<String>,
    /// Stop after this many inverter frames per file
    pub max_frames: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    pub output_file: Option<PathBuf>,
    /// Print decoding statistics to stderr when done
    #[serde(default)]
    pub summary: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Multi-line text blocks, one per frame
    #[default]
    Txt,
    /// One JSON object per line
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Reject ID layouts that cannot exist on the bus
pub fn validate(config: &AppConfig) -> Result<()> {
    let decoder = &config.decoder;
    if decoder.base_id > MAX_CAN_ID {
        bail!("base_id 0x{:X} is not a valid CAN ID", decoder.base_id);
    }
    if decoder.fault_id > MAX_CAN_ID {
        bail!("fault_id 0x{:X} is not a valid CAN ID", decoder.fault_id);
    }
    if *decoder.message_range().end() > MAX_CAN_ID {
        bail!("base_id 0x{:X} leaves no room for the broadcast block", decoder.base_id);
    }
    Ok(())
}
