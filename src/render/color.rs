//! Per-LED color expressions and their frame-time resolution.
//!
//! Configuration assigns one color expression per LED slot. Expressions are
//! parsed once at configuration load into [`ColorExpr`] and evaluated every
//! frame against the current metrics, clock and cycle position.
//!
//! Supported forms:
//! - `"ffe000"` — literal color
//! - `"random"` — fresh random color every frame
//! - `"ff0000-0000ff"` — two-stop fade driven by the cycle counter
//! - `"ff0000-0000ff-cpu_temp"` — two-stop fade driven by a metric
//!   (or `seconds`/`minutes`/`hours` for the clock)
//! - `"cpu_temp;0000ff:30;ff0000:90"` — multi-stop gradient over a metric

use chrono::{NaiveTime, Timelike};
use log::warn;

use crate::config::MetricBounds;
use crate::error::{PanelError, Result};
use crate::metrics::MetricsSnapshot;
use crate::protocol::NUM_LEDS;

// =============================================================================
// Constants
// =============================================================================

/// Color used for slots the configuration does not cover.
pub const DEFAULT_COLOR: Rgb = Rgb {
    r: 0xff,
    g: 0xe0,
    b: 0x00,
};

/// Color applied to the whole table when the configured list is unusable.
pub const FALLBACK_COLOR: Rgb = Rgb {
    r: 0xff,
    g: 0x00,
    b: 0x00,
};

// =============================================================================
// Rgb
// =============================================================================

/// One 24-bit RGB color, transmitted as six hex digits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse a six-hex-digit color, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PanelError::InvalidColorExpr {
                expr: hex.to_string(),
                reason: "expected six hex digits".into(),
            });
        }
        Ok(Rgb {
            r: u8::from_str_radix(&hex[0..2], 16).unwrap_or(0),
            g: u8::from_str_radix(&hex[2..4], 16).unwrap_or(0),
            b: u8::from_str_radix(&hex[4..6], 16).unwrap_or(0),
        })
    }

    /// Uniformly random color, fresh every call.
    pub fn random() -> Self {
        let v: u32 = rand::random();
        Rgb {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Interpolate one channel linearly in 0-255 space.
///
/// Rounding policy for all color interpolation: round half up.
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Interpolate between two colors with a clamped factor.
pub fn lerp_color(start: Rgb, end: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    Rgb {
        r: lerp_channel(start.r, end.r, t),
        g: lerp_channel(start.g, end.g, t),
        b: lerp_channel(start.b, end.b, t),
    }
}

// =============================================================================
// Color Expressions
// =============================================================================

/// Clock field driving a legacy two-stop gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockField {
    Seconds,
    Minutes,
    Hours,
}

impl ClockField {
    fn factor(self, now: NaiveTime) -> f32 {
        match self {
            ClockField::Seconds => now.second() as f32 / 59.0,
            ClockField::Minutes => now.minute() as f32 / 59.0,
            ClockField::Hours => now.hour() as f32 / 23.0,
        }
    }
}

/// What moves a two-stop gradient between its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientDriver {
    /// Triangular ping-pong over the cycle counter. All slots using this
    /// driver share the one global phase.
    Cycle,
    /// Wall-clock field.
    Clock(ClockField),
    /// Named metric, normalized between its configured min/max.
    Metric(String),
}

/// One anchor of a multi-stop gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: Rgb,
    pub value: f32,
}

/// A parsed per-slot color expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorExpr {
    Literal(Rgb),
    Random,
    TwoStop {
        start: Rgb,
        end: Rgb,
        driver: GradientDriver,
    },
    MultiStop {
        metric: String,
        /// Sorted ascending by value at parse time.
        stops: Vec<GradientStop>,
    },
}

impl ColorExpr {
    /// Parse one configured color expression string.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case("random") {
            return Ok(ColorExpr::Random);
        }

        if raw.contains(';') {
            return Self::parse_multi_stop(raw);
        }

        if raw.contains('-') {
            return Self::parse_two_stop(raw);
        }

        Ok(ColorExpr::Literal(Rgb::from_hex(raw)?))
    }

    fn parse_two_stop(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('-').collect();
        match parts.as_slice() {
            [start, end] => Ok(ColorExpr::TwoStop {
                start: Rgb::from_hex(start)?,
                end: Rgb::from_hex(end)?,
                driver: GradientDriver::Cycle,
            }),
            [start, end, driver] => {
                let driver = match *driver {
                    "seconds" => GradientDriver::Clock(ClockField::Seconds),
                    "minutes" => GradientDriver::Clock(ClockField::Minutes),
                    "hours" => GradientDriver::Clock(ClockField::Hours),
                    metric => GradientDriver::Metric(metric.to_string()),
                };
                Ok(ColorExpr::TwoStop {
                    start: Rgb::from_hex(start)?,
                    end: Rgb::from_hex(end)?,
                    driver,
                })
            }
            _ => Err(PanelError::InvalidColorExpr {
                expr: raw.to_string(),
                reason: "expected 'start-end' or 'start-end-driver'".into(),
            }),
        }
    }

    fn parse_multi_stop(raw: &str) -> Result<Self> {
        let mut parts = raw.split(';');
        let metric = parts
            .next()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| PanelError::InvalidColorExpr {
                expr: raw.to_string(),
                reason: "missing metric name".into(),
            })?
            .to_string();

        let mut stops = Vec::new();
        for stop in parts {
            let (color, value) =
                stop.split_once(':')
                    .ok_or_else(|| PanelError::InvalidColorExpr {
                        expr: raw.to_string(),
                        reason: format!("stop '{}' is not 'color:value'", stop),
                    })?;
            let value: f32 = value.parse().map_err(|_| PanelError::InvalidColorExpr {
                expr: raw.to_string(),
                reason: format!("stop value '{}' is not a number", value),
            })?;
            stops.push(GradientStop {
                color: Rgb::from_hex(color)?,
                value,
            });
        }

        if stops.is_empty() {
            return Err(PanelError::InvalidColorExpr {
                expr: raw.to_string(),
                reason: "gradient needs at least one stop".into(),
            });
        }

        stops.sort_by(|a, b| a.value.total_cmp(&b.value));

        Ok(ColorExpr::MultiStop { metric, stops })
    }

    /// Evaluate this expression against the current frame inputs.
    pub fn resolve(&self, inputs: &FrameInputs) -> Rgb {
        match self {
            ColorExpr::Literal(color) => *color,
            ColorExpr::Random => Rgb::random(),
            ColorExpr::TwoStop { start, end, driver } => {
                lerp_color(*start, *end, driver_factor(driver, inputs))
            }
            ColorExpr::MultiStop { metric, stops } => resolve_multi_stop(metric, stops, inputs),
        }
    }
}

// =============================================================================
// Frame-time Resolution
// =============================================================================

/// Everything a color expression may read during one frame.
pub struct FrameInputs<'a> {
    pub metrics: &'a MetricsSnapshot,
    pub now: NaiveTime,
    /// Current cycle counter value (modulo twice the cycle length).
    pub cycle_pos: u32,
    /// Cycle length in render ticks.
    pub cycle_ticks: u32,
    pub bounds: &'a MetricBounds,
}

fn driver_factor(driver: &GradientDriver, inputs: &FrameInputs) -> f32 {
    match driver {
        GradientDriver::Cycle => {
            let len = inputs.cycle_ticks.max(1) as f32;
            let pos = (inputs.cycle_pos % inputs.cycle_ticks.max(1)) as f32;
            1.0 - (pos - len / 2.0).abs() / (len / 2.0)
        }
        GradientDriver::Clock(field) => field.factor(inputs.now),
        GradientDriver::Metric(metric) => {
            let Some(value) = inputs.metrics.get(metric) else {
                warn!("metric '{}' not found, using start color", metric);
                return 0.0;
            };
            let Some((min, max)) = inputs.bounds.get(metric) else {
                warn!("no bounds configured for metric '{}', using start color", metric);
                return 0.0;
            };
            if min == max {
                warn!(
                    "metric '{}' min and max are both {}, using start color",
                    metric, min
                );
                return 0.0;
            }
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        }
    }
}

fn resolve_multi_stop(metric: &str, stops: &[GradientStop], inputs: &FrameInputs) -> Rgb {
    let Some(value) = inputs.metrics.get(metric) else {
        warn!("metric '{}' not found, using first stop color", metric);
        return stops[0].color;
    };

    if value <= stops[0].value {
        return stops[0].color;
    }
    let last = &stops[stops.len() - 1];
    if value >= last.value {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if lo.value <= value && value < hi.value {
            let t = (value - lo.value) / (hi.value - lo.value);
            return lerp_color(lo.color, hi.color, t);
        }
    }

    // Unreachable: the clamps above bracket every remaining value.
    last.color
}

/// Parse a configured color list into one expression per LED slot.
///
/// An empty/missing list yields the default color everywhere. A list of the
/// wrong length degrades the whole table to the fallback color (one warning,
/// global, not per slot). A slot that fails to parse degrades alone.
pub fn parse_color_list(raw: &[String], section: &str) -> Vec<ColorExpr> {
    if raw.is_empty() {
        return vec![ColorExpr::Literal(DEFAULT_COLOR); NUM_LEDS];
    }
    if raw.len() != NUM_LEDS {
        warn!(
            "config '{}' has {} colors but the panel has {} LEDs, using fallback colors",
            section,
            raw.len(),
            NUM_LEDS
        );
        return vec![ColorExpr::Literal(FALLBACK_COLOR); NUM_LEDS];
    }

    raw.iter()
        .map(|s| match ColorExpr::parse(s) {
            Ok(expr) => expr,
            Err(e) => {
                warn!("{}, using default color", e);
                ColorExpr::Literal(DEFAULT_COLOR)
            }
        })
        .collect()
}

/// Resolve a full expression table into concrete colors for one frame.
pub fn resolve_table(exprs: &[ColorExpr], inputs: &FrameInputs) -> Vec<Rgb> {
    exprs.iter().map(|e| e.resolve(inputs)).collect()
}

// =============================================================================
// Tests
// =============================================================================
