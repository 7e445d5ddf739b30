//! Viewer configuration supplied by the host page as JSON.
//!
//! Every field has a default, so `{}` is a complete config and a page only
//! spells out what it overrides.

use runtime::tween::Ease;
use scene::components::Color;
use scene::prefabs::{GlobeParams, MarkerSpec, MarkerStyle};
use scene::starfield::StarfieldParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::countries::Population;

pub const DEFAULT_LOG_FILTER: &str = "info,wgpu=warn,naga=warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("viewer config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid marker color {0:?}, expected #RRGGBB")]
    InvalidColor(String),
    #[error("invalid {field}: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub globe: GlobeConfig,
    pub stars: StarsConfig,
    pub camera: CameraConfig,
    pub markers: MarkersConfig,
    pub interaction: InteractionConfig,
    pub dom: DomConfig,
    pub assets: AssetsConfig,
    /// Hand-placed markers, spawned after the dataset markers.
    pub extra_markers: Vec<ExtraMarker>,
    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            globe: GlobeConfig::default(),
            stars: StarsConfig::default(),
            camera: CameraConfig::default(),
            markers: MarkersConfig::default(),
            interaction: InteractionConfig::default(),
            dom: DomConfig::default(),
            assets: AssetsConfig::default(),
            extra_markers: vec![ExtraMarker {
                lat: 23.6345,
                lng: -102.5528,
                country: "Mexico".to_string(),
                population: Population::Label("300mil".to_string()),
            }],
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    pub radius: f64,
    pub segments: u32,
    pub texture_yaw_deg: f64,
    pub atmosphere_scale: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            segments: 50,
            texture_yaw_deg: -90.0,
            atmosphere_scale: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarsConfig {
    pub count: usize,
    pub spread: f64,
    pub depth: f64,
    /// Fixed seed for a reproducible backdrop. `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            spread: 2000.0,
            depth: 2000.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Camera sits on +Z at this distance, looking at the origin.
    pub distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 70.0,
            near: 0.1,
            far: 1000.0,
            distance: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkersConfig {
    pub color: String,
    pub base_opacity: f32,
    pub hover_opacity: f32,
    pub width: f64,
    pub min_depth: f64,
    pub height_per_billion: f64,
    pub pulse_scale: f64,
    pub pulse_duration_s: f64,
    pub max_pulse_delay_s: f64,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            color: "#3BF7FF".to_string(),
            base_opacity: 0.4,
            hover_opacity: 1.0,
            width: 0.11,
            min_depth: 0.4,
            height_per_billion: 0.8,
            pulse_scale: 1.4,
            pulse_duration_s: 2.0,
            max_pulse_delay_s: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radians of rotation per pixel dragged.
    pub drag_sensitivity: f64,
    pub rotation_tween_s: f64,
    pub rotation_ease: Ease,
    /// Radians added to the group yaw every frame.
    pub idle_spin_rad: f64,
    /// Window widths at or above this use the split desktop layout.
    pub desktop_breakpoint_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            rotation_tween_s: 2.0,
            rotation_ease: Ease::Power1Out,
            idle_spin_rad: 0.0002,
            desktop_breakpoint_px: 1280.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomConfig {
    pub canvas_id: String,
    pub tooltip_id: String,
    pub country_id: String,
    pub population_id: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".to_string(),
            tooltip_id: "popUpEl".to_string(),
            country_id: "country".to_string(),
            population_id: "population".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    pub countries_url: String,
    pub globe_texture_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            countries_url: "./countries.json".to_string(),
            globe_texture_url: "./img/globe.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraMarker {
    pub lat: f64,
    pub lng: f64,
    pub country: String,
    pub population: Population,
}

impl ExtraMarker {
    pub fn marker_spec(&self) -> MarkerSpec {
        MarkerSpec {
            lat_deg: self.lat,
            lon_deg: self.lng,
            country: self.country.clone(),
            population: self.population.count(),
            population_label: self.population.display(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.marker_color()?;
        let positive = [
            ("globe.radius", self.globe.radius),
            ("globe.atmosphere_scale", self.globe.atmosphere_scale),
            ("camera.fov_y_deg", self.camera.fov_y_deg),
            ("camera.near", self.camera.near),
            ("camera.far", self.camera.far),
            ("camera.distance", self.camera.distance),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        if self.camera.fov_y_deg >= 180.0 {
            return Err(ConfigError::OutOfRange {
                field: "camera.fov_y_deg",
                value: self.camera.fov_y_deg,
            });
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::OutOfRange {
                field: "camera.far",
                value: self.camera.far,
            });
        }
        Ok(())
    }

    pub fn marker_color(&self) -> Result<Color, ConfigError> {
        Color::from_hex(&self.markers.color)
            .ok_or_else(|| ConfigError::InvalidColor(self.markers.color.clone()))
    }

    pub fn globe_params(&self) -> GlobeParams {
        GlobeParams {
            radius: self.globe.radius,
            segments: self.globe.segments.max(3),
            texture_yaw_rad: self.globe.texture_yaw_deg.to_radians(),
            atmosphere_scale: self.globe.atmosphere_scale,
        }
    }

    pub fn starfield_params(&self) -> StarfieldParams {
        StarfieldParams {
            count: self.stars.count,
            spread: self.stars.spread,
            depth: self.stars.depth,
        }
    }

    /// Marker style; an unparsable color falls back to the default cyan.
    pub fn marker_style(&self) -> MarkerStyle {
        let defaults = MarkerStyle::default();
        MarkerStyle {
            color: self.marker_color().unwrap_or(defaults.color),
            base_opacity: self.markers.base_opacity,
            width: self.markers.width,
            min_depth: self.markers.min_depth,
            height_per_billion: self.markers.height_per_billion,
            pulse_scale: self.markers.pulse_scale,
            pulse_duration_s: self.markers.pulse_duration_s,
            max_pulse_delay_s: self.markers.max_pulse_delay_s,
        }
    }
}
