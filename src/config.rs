use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Empirically tuned factors used to keep strokes and handles usable across zoom levels.
///
/// None of these are load-bearing; the mechanism is that on-screen sizes are inversely
/// proportional to the view scale and boosted for small views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Nominal handle extent in screen pixels
    pub handle_size_px: f32,
    /// Handle multiplier applied when the canvas is shown at 1x or smaller
    pub small_view_boost: f32,
    /// Image width at which the stroke scale is 1.0
    pub reference_width: f32,
    /// Stroke scale multiplier when zoomed in past 1x
    pub zoomed_in_factor: f32,
    /// Upper bound for the stroke scale
    pub max_stroke_scale: f32,
    pub min_text_scale: f32,
    pub max_text_scale: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            handle_size_px: 10.0,
            small_view_boost: 1.5,
            reference_width: 1000.0,
            zoomed_in_factor: 0.4,
            max_stroke_scale: 3.0,
            min_text_scale: 0.5,
            max_text_scale: 5.0,
        }
    }
}

/// Editor-wide configuration, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of undo snapshots kept per image
    pub max_history: usize,
    /// Arrowhead segment length in canvas units (before stroke scaling)
    pub arrow_length: f32,
    /// Maximum distance between two eraser stamps
    pub eraser_spacing: f32,
    /// Alpha of highlighter strokes, 0.0..=1.0
    pub highlighter_opacity: f32,
    /// JPEG quality used when the caller doesn't specify one
    pub default_quality: u8,
    /// Quality multiplier applied to JPEG output of HEIF sources
    pub heif_quality_scale: f32,
    /// Wrap width of new text boxes in canvas units (before text scaling)
    pub text_box_width: f32,
    /// Also expose edge handles on rectangles and ellipses
    pub extended_handles: bool,
    /// Directory name, next to the source images, used by the app for exports
    pub export_dir_name: String,
    /// Font family name to font file
    pub font_files: BTreeMap<String, PathBuf>,
    pub scaling: ScaleConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 10,
            arrow_length: 15.0,
            eraser_spacing: 2.0,
            highlighter_opacity: 0.35,
            default_quality: 85,
            heif_quality_scale: 0.85,
            text_box_width: 300.0,
            extended_handles: false,
            export_dir_name: "exported".to_owned(),
            font_files: BTreeMap::new(),
            scaling: ScaleConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        log::info!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load from `path` if given, falling back to defaults (with a warning) on failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|err| {
                log::warn!("Using default config, {}: {}", path.display(), err);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "max_history": 4, "scaling": { "max_stroke_scale": 2.0 } }"#)
                .unwrap();
        assert_eq!(config.max_history, 4);
        assert_eq!(config.scaling.max_stroke_scale, 2.0);
        assert_eq!(config.scaling.reference_width, 1000.0);
        assert_eq!(config.arrow_length, 15.0);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = serde_json::from_str::<EditorConfig>("{ max_history: }").unwrap_err();
        assert!(matches!(ConfigError::from(err), ConfigError::Parse(_)));
    }
}
