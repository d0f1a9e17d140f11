/// Physical display description, fixed for a rendering session
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Screen size in pixels plus the physical constants needed to build a
/// frustum that matches what the viewer actually sees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DisplayParameters {
    /// Canvas width in pixels
    pub canvas_width: f32,
    /// Canvas height in pixels
    pub canvas_height: f32,
    /// Millimeters per pixel
    pub pixel_pitch: f32,
    /// Eye to screen distance in millimeters
    pub distance_screen_viewer: f32,
}

impl DisplayParameters {
    pub fn new(
        canvas_width: f32,
        canvas_height: f32,
        pixel_pitch: f32,
        distance_screen_viewer: f32,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            canvas_width,
            canvas_height,
            pixel_pitch,
            distance_screen_viewer,
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse and validate a JSON display description
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("pixel_pitch", self.pixel_pitch),
            ("distance_screen_viewer", self.distance_screen_viewer),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDisplay { field, value });
            }
        }
        Ok(())
    }

    /// Half of the physical screen width in millimeters
    pub fn half_width_mm(&self) -> f32 {
        self.canvas_width * self.pixel_pitch / 2.0
    }

    /// Half of the physical screen height in millimeters
    pub fn half_height_mm(&self) -> f32 {
        self.canvas_height * self.pixel_pitch / 2.0
    }
}

impl Default for DisplayParameters {
    /// A 1920x1080 panel with a 0.311mm pitch viewed from half a meter
    fn default() -> Self {
        Self {
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            pixel_pitch: 0.311,
            distance_screen_viewer: 500.0,
        }
    }
}
