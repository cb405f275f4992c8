use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side of the global coordinate space; the world is centered on (500, 500).
pub const MAP_SPAN: i32 = 1000;

/// Scale factors accepted by the renderer.
pub const MIN_SCALE: u32 = 1;
pub const MAX_SCALE: u32 = 5;

pub type TribeId = u64;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate group name: {0}")]
    DuplicateGroupName(String),

    #[error("Tribe {tribe} is claimed by both '{first}' and '{second}'")]
    TribeClaimedTwice {
        tribe: TribeId,
        first: String,
        second: String,
    },

    #[error("Scale {0} is outside 1..=5")]
    ScaleOutOfRange(u32),
}

pub type StatusOr<T> = Result<T, SchemaError>;

/// A single village on the map
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Village {
    pub x: i32,
    pub y: i32,
    pub points: u32,
}

/// A tribe and the villages it owns in one turn
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TribeRecord {
    pub id: TribeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub villages: Vec<Village>,
}

/// World snapshot for a single turn
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnData {
    #[serde(default)]
    pub turn: u32,
    /// Side of the populated square in the middle of the map, in map units
    pub width: i32,
    #[serde(default)]
    pub tribes: BTreeMap<TribeId, TribeRecord>,
}

impl TurnData {
    pub fn from_json(json: &str) -> StatusOr<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn village_count(&self) -> usize {
        self.tribes.values().map(|t| t.villages.len()).sum()
    }
}

/// A named, colored bucket of tribes
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkGroup {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub tribes: Vec<TribeId>,
}

/// Free text drawn at an absolute pixel position
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Caption {
    pub text: String,
    pub color: String,
    pub font_size: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: "#ffffff".to_string(),
            font_size: 16,
            x: 0,
            y: 0,
        }
    }
}

/// Everything needed to render one map
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub background_color: String,
    pub border_color: String,
    pub scale: u32,               // Pixels per map unit
    pub output_width: Option<i32>, // Output side in map units, ignored when trimming
    pub trim: bool,
    pub top_spot_size: u32,       // Spot radius of the strongest villages
    pub groups: Vec<MarkGroup>,
    pub captions: Vec<Caption>,
    pub smooth: bool,
    pub draw_borders: bool,
    pub draw_legend: bool,
    pub legend_font_size: u32,    // Percent of the raster width
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background_color: "#000000".to_string(),
            border_color: "#ffffff".to_string(),
            scale: 2,
            output_width: None,
            trim: false,
            top_spot_size: 8,
            groups: Vec::new(),
            captions: Vec::new(),
            smooth: true,
            draw_borders: true,
            draw_legend: true,
            legend_font_size: 3,
        }
    }
}

impl RenderSettings {
    pub fn from_json(json: &str) -> StatusOr<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the invariants the renderer assumes but does not enforce.
    pub fn validate(&self) -> StatusOr<()> {
        if !(MIN_SCALE..=MAX_SCALE).contains(&self.scale) {
            return Err(SchemaError::ScaleOutOfRange(self.scale));
        }

        let mut names = HashSet::new();
        let mut owners: HashMap<TribeId, &str> = HashMap::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                return Err(SchemaError::DuplicateGroupName(group.name.clone()));
            }
            for &tribe in &group.tribes {
                if let Some(first) = owners.insert(tribe, &group.name) {
                    return Err(SchemaError::TribeClaimedTwice {
                        tribe,
                        first: first.to_string(),
                        second: group.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
