use anyhow::{Context, Result};
use log::{debug, warn};
use schema::{RenderSettings, TurnData};
use std::fs;
use std::path::Path;

/// Reads one turn snapshot from a JSON file
pub fn load_turn<P: AsRef<Path>>(path: P) -> Result<TurnData> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read turn file: {:?}", path))?;
    let turn = TurnData::from_json(&json)
        .with_context(|| format!("Failed to parse turn file: {:?}", path))?;

    if turn.width <= 0 {
        warn!("Turn {} in {:?} has width {}, it will render as background", turn.turn, path, turn.width);
    }
    debug!("Loaded turn {} with {} tribes from {:?}", turn.turn, turn.tribes.len(), path);
    Ok(turn)
}

/// Reads render settings from a JSON file and rejects inconsistent ones
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<RenderSettings> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;
    let settings = RenderSettings::from_json(&json)
        .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {:?}", path))?;

    debug!("Loaded settings with {} groups from {:?}", settings.groups.len(), path);
    Ok(settings)
}
