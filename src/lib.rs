//! Digital LCD Rust Library
//!
//! A Rust driver for USB HID seven-segment telemetry panels.
//!
//! # Features
//!
//! - Render CPU/GPU temperature, utilization and clock time as segment frames
//! - Per-LED color expressions: literals, random, two-stop and multi-stop
//!   gradients driven by metrics, the clock or a breathing cycle
//! - Serialize frames into the panel's fixed five-packet HID protocol
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use digital_lcd_rust::config::AppConfig;
//! use digital_lcd_rust::device::SegmentPanel;
//! use digital_lcd_rust::metrics::MetricsSampler;
//! use digital_lcd_rust::protocol::serialize_frame;
//! use digital_lcd_rust::render::{ComposeInputs, Composer};
//! use digital_lcd_rust::render::color::parse_color_list;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let panel = SegmentPanel::open(config.vendor_id(), config.product_id())?;
//!
//!     let mut sampler = MetricsSampler::new();
//!     let mut composer = Composer::new();
//!     composer.set_layout_mode(config.layout_mode());
//!     composer.set_cycle_ticks(config.cycle_ticks());
//!
//!     let mode = config.display_mode().validate_for_layout(config.layout_mode());
//!     let metrics_exprs = parse_color_list(&config.metrics.colors, "metrics");
//!     let time_exprs = parse_color_list(&config.time.colors, "time");
//!     let bounds = config.bounds();
//!
//!     let metrics = sampler.sample(config.temp_units());
//!     let frame = composer.compose(&mode, &ComposeInputs {
//!         metrics: &metrics,
//!         units: config.temp_units(),
//!         now: Local::now().time(),
//!         metrics_exprs: &metrics_exprs,
//!         time_exprs: &time_exprs,
//!         bounds: &bounds,
//!     })?;
//!     panel.send_frame(&serialize_frame(&frame.leds, &frame.colors))?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod protocol;
pub mod render;

// Re-exports for convenience
pub use config::{AppConfig, DisplayMode};
pub use device::SegmentPanel;
pub use error::{PanelError, Result};
pub use render::{Composer, PanelFrame};
