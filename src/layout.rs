//! Panel layouts: named regions mapping to physical LED indexes.
//!
//! Two built-in wiring layouts exist ("big" and "small"). The richer
//! per-digit segment maps used by the peerless display modes are loaded from
//! a `layout.json` file instead, matching the JSON the panel vendor ships.

use std::collections::HashMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};
use crate::protocol::NUM_LEDS;
use crate::render::segments::Segment;

// =============================================================================
// Built-in Layouts
// =============================================================================

/// Which of the two physical panel variants is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Dual-device panel: temperature + usage fields for CPU and GPU.
    #[default]
    Big,
    /// Single digit-frame panel with shared indicator LEDs.
    Small,
}

impl LayoutMode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "small" => LayoutMode::Small,
            _ => LayoutMode::Big,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::Big => "big",
            LayoutMode::Small => "small",
        }
    }
}

/// Name → LED index list mapping for one layout variant.
#[derive(Debug, Clone)]
pub struct Layout {
    mode: LayoutMode,
    regions: HashMap<&'static str, Vec<usize>>,
}

impl Layout {
    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Big => Self::big(),
            LayoutMode::Small => Self::small(),
        }
    }

    /// Dual-device layout. Each half carries a 3-digit temperature field,
    /// a 2-digit usage field with a leading overflow pair, unit/percent
    /// indicators and a device indicator.
    pub fn big() -> Self {
        let mut regions: HashMap<&'static str, Vec<usize>> = HashMap::new();

        regions.insert("cpu_temp", range(0, 21));
        regions.insert("cpu_celsius", vec![21]);
        regions.insert("cpu_fahrenheit", vec![22]);
        regions.insert("cpu_usage", range(23, 39));
        regions.insert("cpu_percent_led", vec![39]);
        regions.insert("cpu_led", vec![40]);
        regions.insert("cpu", range(0, 50));

        regions.insert("gpu_temp", range(50, 71));
        regions.insert("gpu_celsius", vec![71]);
        regions.insert("gpu_fahrenheit", vec![72]);
        regions.insert("gpu_usage", range(73, 89));
        regions.insert("gpu_percent_led", vec![89]);
        regions.insert("gpu_led", vec![90]);
        regions.insert("gpu", range(50, 100));

        Self {
            mode: LayoutMode::Big,
            regions,
        }
    }

    /// Single digit-frame layout.
    pub fn small() -> Self {
        let mut regions: HashMap<&'static str, Vec<usize>> = HashMap::new();

        regions.insert("digit_frame", range(0, 21));
        regions.insert("celsius", vec![21]);
        regions.insert("fahrenheit", vec![22]);
        regions.insert("percent_led", vec![23]);
        regions.insert("cpu_led", vec![24]);
        regions.insert("gpu_led", vec![25]);

        Self {
            mode: LayoutMode::Small,
            regions,
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Look up a region's LED indexes by name.
    pub fn region(&self, name: &str) -> Option<&[usize]> {
        self.regions.get(name).map(Vec::as_slice)
    }
}

fn range(start: usize, end: usize) -> Vec<usize> {
    (start..end).collect()
}

// =============================================================================
// Peerless Layout File
// =============================================================================

/// Per-segment LED indexes for one digit position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMap {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub e: usize,
    pub f: usize,
    pub g: usize,
}

impl SegmentMap {
    pub fn index_of(&self, segment: Segment) -> usize {
        match segment {
            Segment::A => self.a,
            Segment::B => self.b,
            Segment::C => self.c,
            Segment::D => self.d,
            Segment::E => self.e,
            Segment::F => self.f,
            Segment::G => self.g,
        }
    }
}

/// One digit position of a peerless field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitMap {
    pub map: SegmentMap,
}

/// The two LEDs forming the fixed leading '1' shown when usage reaches 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverflowPair {
    pub top: usize,
    pub bottom: usize,
}

/// Region structure read from `layout.json` for the peerless display modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerlessLayout {
    pub cpu_temp_digits: Vec<DigitMap>,
    pub cpu_celsius: usize,
    pub cpu_fahrenheit: usize,
    pub cpu_usage_digits: Vec<DigitMap>,
    pub cpu_usage_1: OverflowPair,
    pub cpu_percent: usize,
    pub cpu_led: Vec<usize>,

    pub gpu_temp_digits: Vec<DigitMap>,
    pub gpu_celsius: usize,
    pub gpu_fahrenheit: usize,
    pub gpu_usage_digits: Vec<DigitMap>,
    pub gpu_usage_1: OverflowPair,
    pub gpu_percent: usize,
    pub gpu_led: Vec<usize>,
}

/// Borrowed view of one device's half of a peerless layout.
pub struct PeerlessDevice<'a> {
    pub temp_digits: &'a [DigitMap],
    pub celsius: usize,
    pub fahrenheit: usize,
    pub usage_digits: &'a [DigitMap],
    pub usage_1: &'a OverflowPair,
    pub percent: usize,
    pub led: &'a [usize],
}

impl PeerlessLayout {
    /// The regions belonging to one device.
    pub fn device(&self, device: crate::metrics::Device) -> PeerlessDevice<'_> {
        use crate::metrics::Device;
        match device {
            Device::Cpu => PeerlessDevice {
                temp_digits: &self.cpu_temp_digits,
                celsius: self.cpu_celsius,
                fahrenheit: self.cpu_fahrenheit,
                usage_digits: &self.cpu_usage_digits,
                usage_1: &self.cpu_usage_1,
                percent: self.cpu_percent,
                led: &self.cpu_led,
            },
            Device::Gpu => PeerlessDevice {
                temp_digits: &self.gpu_temp_digits,
                celsius: self.gpu_celsius,
                fahrenheit: self.gpu_fahrenheit,
                usage_digits: &self.gpu_usage_digits,
                usage_1: &self.gpu_usage_1,
                percent: self.gpu_percent,
                led: &self.gpu_led,
            },
        }
    }

    /// Load a peerless layout from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PanelError::InvalidLayout(format!("failed to read layout: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| PanelError::InvalidLayout(format!("failed to parse layout: {}", e)))
    }

    /// Load a peerless layout, degrading to `None` with a warning when the
    /// file is missing or malformed. Peerless modes then draw nothing.
    pub fn load_or_none(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(layout) => Some(layout),
            Err(e) => {
                warn!("{} (peerless display modes disabled)", e);
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
