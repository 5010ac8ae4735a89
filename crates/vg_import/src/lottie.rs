//! Lottie (Bodymovin) composition documents
//!
//! Only the composition header is modeled: timing, size, markers and the
//! number of layers, assets, fonts and glyphs. Layers are kept as raw JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use vg_core::Rect;

use crate::error::Result;

/// Named time range of a composition
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LottieMarker {
    #[serde(rename = "cm", default)]
    pub name: String,
    #[serde(rename = "tm", default)]
    pub start_frame: f32,
    #[serde(rename = "dr", default)]
    pub duration_frames: f32,
}

impl LottieMarker {
    /// Compare `name` with the marker name lowercased, with or without
    /// trailing whitespace
    pub fn matches_name(&self, name: &str) -> bool {
        let lower = self.name.to_lowercase();
        name == lower || name == lower.trim_end()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LottieFonts {
    #[serde(default)]
    pub list: Vec<serde_json::Value>,
}

/// Accepts `0`/`1` as well as booleans
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// After Effects composition exported by Bodymovin
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LottieComposition {
    #[serde(rename = "v", default)]
    pub version: String,
    #[serde(rename = "fr", default)]
    pub frame_rate: f32,
    #[serde(rename = "nm", default)]
    pub name: String,
    #[serde(rename = "ddd", default, deserialize_with = "flag")]
    pub three_dimensional: bool,
    #[serde(rename = "ip", default)]
    pub start_frame: f32,
    #[serde(rename = "op", default)]
    pub end_frame: f32,
    #[serde(rename = "w", default)]
    pub width: f32,
    #[serde(rename = "h", default)]
    pub height: f32,
    #[serde(default)]
    pub markers: Vec<LottieMarker>,
    #[serde(default)]
    pub layers: Vec<serde_json::Value>,
    #[serde(default)]
    pub assets: Vec<serde_json::Value>,
    #[serde(default)]
    pub fonts: LottieFonts,
    #[serde(default)]
    pub chars: Vec<serde_json::Value>,
}

impl LottieComposition {
    pub fn from_json(json: &str) -> Result<Self> {
        let composition: Self = serde_json::from_str(json)?;
        debug!(
            name = %composition.name,
            layers = composition.layers.len(),
            frames = composition.duration_frames(),
            "parsed lottie composition"
        );
        Ok(composition)
    }

    pub fn duration_frames(&self) -> f32 {
        self.end_frame - self.start_frame
    }

    /// Duration in seconds, zero without a frame rate
    pub fn duration_seconds(&self) -> f32 {
        if self.frame_rate > 0.0 {
            self.duration_frames() / self.frame_rate
        } else {
            0.0
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// First marker matching `name`
    pub fn marker(&self, name: &str) -> Option<&LottieMarker> {
        self.markers.iter().find(|m| m.matches_name(name))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.list.len()
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }
}

/// Loads `.lottiejson` files
#[derive(Clone, Copy, Debug, Default)]
pub struct LottieLoader;

impl LottieLoader {
    pub const EXTENSION: &'static str = "lottiejson";

    pub fn recognize_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.to_lowercase() == Self::EXTENSION)
    }

    pub fn load(&self, path: &Path) -> Result<LottieComposition> {
        let json = fs::read_to_string(path)?;
        LottieComposition::from_json(&json)
    }
}
