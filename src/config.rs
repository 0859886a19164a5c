//! Panel configuration: display modes, thresholds, color lists.
//!
//! The config file is JSON and every field is optional; missing or malformed
//! files degrade to the built-in defaults so the render loop keeps running.
//! Cross-platform: uses the per-OS config directory, overridable via
//! `--config` or the `DIGITAL_LCD_CONFIG` environment variable.

use std::collections::HashMap;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};
use crate::layout::LayoutMode;
use crate::metrics::DeviceUnits;

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "digital-lcd";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "DIGITAL_LCD_CONFIG";

/// Get the configuration directory path.
/// - Linux: ~/.config/digital-lcd/
/// - Windows: %APPDATA%\digital-lcd\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| PanelError::InvalidConfig("Could not find config directory".into()))
}

/// Resolve the config file path: environment override first, then the
/// per-OS config directory.
pub fn default_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Temperature Units
// =============================================================================

/// Temperature unit per device, selectable independently for CPU and GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fahrenheit" => TempUnit::Fahrenheit,
            _ => TempUnit::Celsius,
        }
    }

    /// Region name of this unit's indicator LED.
    pub fn region_name(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "celsius",
            TempUnit::Fahrenheit => "fahrenheit",
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(&self, celsius: f32) -> f32 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

// =============================================================================
// Display Modes
// =============================================================================

/// Which composition routine renders each frame.
///
/// Unrecognized configuration strings are carried as `Unknown` rather than
/// silently mapped, so the composer can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    Metrics,
    Time,
    TimeWithSeconds,
    TimeCpu,
    TimeGpu,
    AlternateTime,
    AlternateTimeWithSeconds,
    AlternateMetrics,
    CpuTemp,
    GpuTemp,
    CpuUsage,
    GpuUsage,
    PeerlessStandard,
    PeerlessTemp,
    PeerlessUsage,
    DebugUi,
    Unknown(String),
}

impl DisplayMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "metrics" => DisplayMode::Metrics,
            "time" => DisplayMode::Time,
            "time_with_seconds" => DisplayMode::TimeWithSeconds,
            "time_cpu" => DisplayMode::TimeCpu,
            "time_gpu" => DisplayMode::TimeGpu,
            "alternate_time" => DisplayMode::AlternateTime,
            "alternate_time_with_seconds" => DisplayMode::AlternateTimeWithSeconds,
            "alternate_metrics" => DisplayMode::AlternateMetrics,
            "cpu_temp" => DisplayMode::CpuTemp,
            "gpu_temp" => DisplayMode::GpuTemp,
            "cpu_usage" => DisplayMode::CpuUsage,
            "gpu_usage" => DisplayMode::GpuUsage,
            "peerless_standard" => DisplayMode::PeerlessStandard,
            // Legacy name kept for old config files.
            "dual_metrics" => DisplayMode::PeerlessStandard,
            "peerless_temp" => DisplayMode::PeerlessTemp,
            "peerless_usage" => DisplayMode::PeerlessUsage,
            "debug_ui" => DisplayMode::DebugUi,
            other => DisplayMode::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DisplayMode::Metrics => "metrics",
            DisplayMode::Time => "time",
            DisplayMode::TimeWithSeconds => "time_with_seconds",
            DisplayMode::TimeCpu => "time_cpu",
            DisplayMode::TimeGpu => "time_gpu",
            DisplayMode::AlternateTime => "alternate_time",
            DisplayMode::AlternateTimeWithSeconds => "alternate_time_with_seconds",
            DisplayMode::AlternateMetrics => "alternate_metrics",
            DisplayMode::CpuTemp => "cpu_temp",
            DisplayMode::GpuTemp => "gpu_temp",
            DisplayMode::CpuUsage => "cpu_usage",
            DisplayMode::GpuUsage => "gpu_usage",
            DisplayMode::PeerlessStandard => "peerless_standard",
            DisplayMode::PeerlessTemp => "peerless_temp",
            DisplayMode::PeerlessUsage => "peerless_usage",
            DisplayMode::DebugUi => "debug_ui",
            DisplayMode::Unknown(s) => s,
        }
    }

    /// Whether this mode can run on the given layout variant.
    pub fn valid_for(&self, layout: LayoutMode) -> bool {
        match layout {
            LayoutMode::Big => matches!(
                self,
                DisplayMode::Metrics
                    | DisplayMode::Time
                    | DisplayMode::TimeWithSeconds
                    | DisplayMode::TimeCpu
                    | DisplayMode::TimeGpu
                    | DisplayMode::AlternateTime
                    | DisplayMode::AlternateTimeWithSeconds
                    | DisplayMode::PeerlessStandard
                    | DisplayMode::PeerlessTemp
                    | DisplayMode::PeerlessUsage
                    | DisplayMode::DebugUi
            ),
            LayoutMode::Small => matches!(
                self,
                DisplayMode::AlternateMetrics
                    | DisplayMode::CpuTemp
                    | DisplayMode::GpuTemp
                    | DisplayMode::CpuUsage
                    | DisplayMode::GpuUsage
                    | DisplayMode::DebugUi
            ),
        }
    }

    /// Default mode for a layout variant, used when the configured mode is
    /// incompatible with it.
    pub fn default_for(layout: LayoutMode) -> Self {
        match layout {
            LayoutMode::Big => DisplayMode::Metrics,
            LayoutMode::Small => DisplayMode::AlternateMetrics,
        }
    }

    /// Downgrade an incompatible mode to the layout's default.
    ///
    /// Called once per configuration reload, so the warning fires once per
    /// reload rather than once per frame.
    pub fn validate_for_layout(self, layout: LayoutMode) -> Self {
        if self.valid_for(layout) {
            return self;
        }
        let fallback = Self::default_for(layout);
        warn!(
            "display mode '{}' is not compatible with the {} layout, switching to '{}'",
            self.name(),
            layout.name(),
            fallback.name()
        );
        fallback
    }
}

// =============================================================================
// Metric Bounds
// =============================================================================

/// Configured min/max per metric, normalizing metric-driven gradients.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricBounds {
    bounds: HashMap<String, (f32, f32)>,
}

impl MetricBounds {
    pub fn set(&mut self, metric: &str, min: f32, max: f32) {
        self.bounds.insert(metric.to_string(), (min, max));
    }

    pub fn get(&self, metric: &str) -> Option<(f32, f32)> {
        self.bounds.get(metric).copied()
    }
}

// =============================================================================
// Config File Structure
// =============================================================================

/// One named color-expression list ("metrics" or "time" section).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorSection {
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Main configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// USB vendor id as a hex string (e.g. "0x0416").
    #[serde(default = "default_vendor_id")]
    pub vendor_id: String,

    /// USB product id as a hex string (e.g. "0x8001").
    #[serde(default = "default_product_id")]
    pub product_id: String,

    #[serde(default = "default_display_mode")]
    pub display_mode: String,

    /// Panel variant: "big" or "small".
    #[serde(default = "default_layout_mode")]
    pub layout_mode: String,

    #[serde(default = "default_temp_unit")]
    pub cpu_temperature_unit: String,

    #[serde(default = "default_temp_unit")]
    pub gpu_temperature_unit: String,

    /// Render interval in seconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: f64,

    /// Alternation/fade cycle length in seconds.
    #[serde(default = "default_cycle_duration")]
    pub cycle_duration: f64,

    /// Metrics refresh interval in seconds (decoupled from rendering).
    #[serde(default = "default_metrics_update_interval")]
    pub metrics_update_interval: f64,

    #[serde(default = "default_min_temp")]
    pub cpu_min_temp: f32,
    #[serde(default = "default_max_temp")]
    pub cpu_max_temp: f32,
    #[serde(default = "default_min_temp")]
    pub gpu_min_temp: f32,
    #[serde(default = "default_max_temp")]
    pub gpu_max_temp: f32,

    #[serde(default = "default_min_usage")]
    pub cpu_min_usage: f32,
    #[serde(default = "default_max_usage")]
    pub cpu_max_usage: f32,
    #[serde(default = "default_min_usage")]
    pub gpu_min_usage: f32,
    #[serde(default = "default_max_usage")]
    pub gpu_max_usage: f32,

    /// Per-LED color expressions for the metric displays.
    #[serde(default)]
    pub metrics: ColorSection,

    /// Per-LED color expressions for the time displays.
    #[serde(default)]
    pub time: ColorSection,
}

fn default_vendor_id() -> String {
    "0x0416".to_string()
}

fn default_product_id() -> String {
    "0x8001".to_string()
}

fn default_display_mode() -> String {
    "metrics".to_string()
}

fn default_layout_mode() -> String {
    "big".to_string()
}

fn default_temp_unit() -> String {
    "celsius".to_string()
}

fn default_update_interval() -> f64 {
    0.1
}

fn default_cycle_duration() -> f64 {
    5.0
}

fn default_metrics_update_interval() -> f64 {
    0.5
}

fn default_min_temp() -> f32 {
    30.0
}

fn default_max_temp() -> f32 {
    90.0
}

fn default_min_usage() -> f32 {
    0.0
}

fn default_max_usage() -> f32 {
    100.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            display_mode: default_display_mode(),
            layout_mode: default_layout_mode(),
            cpu_temperature_unit: default_temp_unit(),
            gpu_temperature_unit: default_temp_unit(),
            update_interval: default_update_interval(),
            cycle_duration: default_cycle_duration(),
            metrics_update_interval: default_metrics_update_interval(),
            cpu_min_temp: default_min_temp(),
            cpu_max_temp: default_max_temp(),
            gpu_min_temp: default_min_temp(),
            gpu_max_temp: default_max_temp(),
            cpu_min_usage: default_min_usage(),
            cpu_max_usage: default_max_usage(),
            gpu_min_usage: default_min_usage(),
            gpu_max_usage: default_max_usage(),
            metrics: ColorSection::default(),
            time: ColorSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PanelError::InvalidConfig(format!("failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| PanelError::InvalidConfig(format!("failed to parse config: {}", e)))
    }

    /// Load configuration, degrading to the built-in defaults with a warning
    /// when the file is missing or malformed.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using default configuration", e);
                Self::default()
            }
        }
    }

    /// Parsed USB vendor id; falls back to the default on a malformed string.
    pub fn vendor_id(&self) -> u16 {
        parse_hex_id(&self.vendor_id).unwrap_or_else(|| {
            warn!("invalid vendor_id '{}', using default", self.vendor_id);
            crate::device::DEFAULT_VENDOR_ID
        })
    }

    /// Parsed USB product id; falls back to the default on a malformed string.
    pub fn product_id(&self) -> u16 {
        parse_hex_id(&self.product_id).unwrap_or_else(|| {
            warn!("invalid product_id '{}', using default", self.product_id);
            crate::device::DEFAULT_PRODUCT_ID
        })
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::parse(&self.display_mode)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        LayoutMode::parse(&self.layout_mode)
    }

    pub fn temp_units(&self) -> DeviceUnits {
        DeviceUnits {
            cpu: TempUnit::parse(&self.cpu_temperature_unit),
            gpu: TempUnit::parse(&self.gpu_temperature_unit),
        }
    }

    /// Cycle length in render ticks. Never below one tick.
    pub fn cycle_ticks(&self) -> u32 {
        let interval = if self.update_interval > 0.0 {
            self.update_interval
        } else {
            default_update_interval()
        };
        ((self.cycle_duration / interval).round() as u32).max(1)
    }

    pub fn bounds(&self) -> MetricBounds {
        let mut bounds = MetricBounds::default();
        bounds.set("cpu_temp", self.cpu_min_temp, self.cpu_max_temp);
        bounds.set("gpu_temp", self.gpu_min_temp, self.gpu_max_temp);
        bounds.set("cpu_usage", self.cpu_min_usage, self.cpu_max_usage);
        bounds.set("gpu_usage", self.gpu_min_usage, self.gpu_max_usage);
        bounds
    }
}

fn parse_hex_id(raw: &str) -> Option<u16> {
    let raw = raw.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(raw, 16).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.vendor_id(), 0x0416);
        assert_eq!(config.product_id(), 0x8001);
        assert_eq!(config.display_mode(), DisplayMode::Metrics);
        assert_eq!(config.layout_mode(), LayoutMode::Big);
    }

    #[test]
    fn test_cycle_ticks_from_seconds() {
        let config = AppConfig::default();
        // 5 s cycle at 0.1 s per tick.
        assert_eq!(config.cycle_ticks(), 50);

        let mut config = AppConfig::default();
        config.update_interval = 0.0;
        assert_eq!(config.cycle_ticks(), 50);
    }

    #[test]
    fn test_display_mode_parse_and_legacy_alias() {
        assert_eq!(DisplayMode::parse("time_cpu"), DisplayMode::TimeCpu);
        assert_eq!(
            DisplayMode::parse("dual_metrics"),
            DisplayMode::PeerlessStandard
        );
        assert_eq!(
            DisplayMode::parse("plasma"),
            DisplayMode::Unknown("plasma".to_string())
        );
    }

    #[test]
    fn test_mode_layout_fallbacks() {
        // Big-only mode under the small layout.
        let mode = DisplayMode::Metrics.validate_for_layout(LayoutMode::Small);
        assert_eq!(mode, DisplayMode::AlternateMetrics);

        // Small-only mode under the big layout.
        let mode = DisplayMode::CpuTemp.validate_for_layout(LayoutMode::Big);
        assert_eq!(mode, DisplayMode::Metrics);

        // Unknown modes are invalid everywhere.
        let mode = DisplayMode::Unknown("plasma".into()).validate_for_layout(LayoutMode::Big);
        assert_eq!(mode, DisplayMode::Metrics);

        // Compatible modes pass through untouched.
        let mode = DisplayMode::PeerlessTemp.validate_for_layout(LayoutMode::Big);
        assert_eq!(mode, DisplayMode::PeerlessTemp);
        let mode = DisplayMode::DebugUi.validate_for_layout(LayoutMode::Small);
        assert_eq!(mode, DisplayMode::DebugUi);
    }

    #[test]
    fn test_temp_unit_conversion() {
        assert_eq!(TempUnit::Celsius.from_celsius(42.0), 42.0);
        assert_eq!(TempUnit::Fahrenheit.from_celsius(0.0), 32.0);
        assert_eq!(TempUnit::Fahrenheit.from_celsius(100.0), 212.0);
    }

    #[test]
    fn test_parse_hex_ids() {
        let mut config = AppConfig::default();
        config.vendor_id = "0x1E71".to_string();
        assert_eq!(config.vendor_id(), 0x1E71);

        config.vendor_id = "garbage".to_string();
        assert_eq!(config.vendor_id(), 0x0416);
    }

    #[test]
    fn test_bounds_lookup() {
        let config = AppConfig::default();
        let bounds = config.bounds();
        assert_eq!(bounds.get("cpu_temp"), Some((30.0, 90.0)));
        assert_eq!(bounds.get("gpu_usage"), Some((0.0, 100.0)));
        assert_eq!(bounds.get("liquid_temp"), None);
    }

    #[test]
    fn test_partial_config_overrides() {
        let json = r#"{
            "display_mode": "time",
            "layout_mode": "small",
            "cpu_temperature_unit": "fahrenheit",
            "cycle_duration": 10.0
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.display_mode(), DisplayMode::Time);
        assert_eq!(config.layout_mode(), LayoutMode::Small);
        assert_eq!(config.temp_units().cpu, TempUnit::Fahrenheit);
        assert_eq!(config.temp_units().gpu, TempUnit::Celsius);
        assert_eq!(config.cycle_ticks(), 100);
        assert_eq!(config.cpu_max_temp, 90.0);
    }
}
