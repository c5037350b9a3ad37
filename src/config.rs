//! Run configuration, read from an optional JSON file and overridden by CLI flags.

use std::path::{ Path, PathBuf };

use serde::{ Deserialize, Serialize };
use thiserror::Error;

use crate::engine::components::camera::{ DisplayMode, OrientationMapping };
use crate::samples::SampleKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720, title: "dome-samples".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub sample: SampleKind,
    /// Still image for the textured samples; a checkerboard is used when unset.
    pub image: Option<PathBuf>,
    /// Directory of numbered frames played on the dome.
    pub frames_dir: Option<PathBuf>,
    pub fps: f32,
    /// Speed of the synthetic orientation source. Zero disables it.
    pub spin_deg_per_sec: f32,
    pub display_mode: DisplayMode,
    /// Whether orientation input moves the camera.
    pub interaction: bool,
    pub orientation_mapping: OrientationMapping,
    pub clear_color: [f32; 4],
    /// Angular step of generated spheres, discs and cylinders, in degrees.
    pub step_deg: f32,
    pub dome_radius: f32,
    pub fov_deg: f32,
    pub mirror_u: bool,
    pub window: WindowConfig,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample: SampleKind::default(),
            image: None,
            frames_dir: None,
            fps: 30.0,
            spin_deg_per_sec: 0.0,
            display_mode: DisplayMode::Normal,
            interaction: true,
            orientation_mapping: OrientationMapping::Passthrough,
            clear_color: [0.1, 0.1, 0.12, 1.0],
            step_deg: 5.0,
            dome_radius: 2.0,
            fov_deg: 70.0,
            mirror_u: false,
            window: WindowConfig::default(),
        }
    }
}

impl SampleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("[CONFIG] loaded {}", path.display());
        Ok(config)
    }

    /// Rejects values that would only fail later on the render thread.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("fps", self.fps),
            ("dome_radius", self.dome_radius),
            ("fov_deg", self.fov_deg),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Frame interval for the dome frame source.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.fps.max(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: SampleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SampleConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn parses_partial_config() {
        let json = r#"{
            "sample": "vr-dome",
            "display_mode": "stereo",
            "orientation_mapping": "swap-yz",
            "interaction": false,
            "frames_dir": "frames",
            "window": { "title": "dome" }
        }"#;
        let config: SampleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sample, SampleKind::VrDome);
        assert_eq!(config.display_mode, DisplayMode::Stereo);
        assert_eq!(config.orientation_mapping, OrientationMapping::SwapYZ);
        assert!(!config.interaction);
        assert_eq!(config.frames_dir.as_deref(), Some(Path::new("frames")));
        assert_eq!(config.window.title, "dome");
        assert_eq!(config.window.height, 720);
        assert_eq!(config.step_deg, 5.0);
    }

    #[test]
    fn unknown_sample_is_rejected() {
        assert!(serde_json::from_str::<SampleConfig>(r#"{ "sample": "teapot" }"#).is_err());
    }

    #[test]
    fn non_positive_values_fail_validation() {
        let config = SampleConfig { fov_deg: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { field: "fov_deg", .. })));
        let config = SampleConfig { fps: f32::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SampleConfig::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("dome-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "sample": "cone", "step_deg": 10.0 }"#).unwrap();
        let config = SampleConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.sample, SampleKind::Cone);
        assert_eq!(config.step_deg, 10.0);
    }
}
