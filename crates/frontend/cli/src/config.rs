use mdflip_genesis::{GenesisError, Plane, PlacementRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Placement and VDP settings, read from a JSON file and overridden by flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlitConfig {
    pub plane: String,
    pub base_tile: u16,
    pub x: u16,
    pub y: u16,
    pub palette: u8,
    pub priority: bool,
    /// Draw without mirroring
    pub plain: bool,
    pub plane_width: u16,
    pub plane_height: u16,
    pub preview: Option<String>,
}

impl Default for BlitConfig {
    fn default() -> Self {
        Self {
            plane: "a".to_string(),
            // Leave tile 0 blank, it backs every empty cell
            base_tile: 1,
            x: 0,
            y: 0,
            palette: 0,
            priority: false,
            plain: false,
            plane_width: 64,
            plane_height: 32,
            preview: None,
        }
    }
}

impl BlitConfig {
    /// Load settings from `path`, falling back to defaults on error
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn placement(&self) -> Result<PlacementRequest, GenesisError> {
        let plane: Plane = self.plane.parse()?;
        if self.palette > 3 {
            return Err(GenesisError::InvalidPalette(format!(
                "palette line {} does not exist",
                self.palette
            )));
        }
        Ok(PlacementRequest::new(plane, self.base_tile, self.x, self.y, self.palette)
            .with_priority(self.priority))
    }
}
