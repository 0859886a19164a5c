//! Frame composition: one (LED state, color state) pair per render tick.
//!
//! The composer owns the per-frame LED buffer, the persistent color buffer
//! and the cycle counter, and dispatches on the configured display mode.
//! Each tick it resolves both configured color tables, runs the mode's
//! composition routine and hands the finished frame to the packetizer.

use chrono::{NaiveTime, Timelike};
use log::warn;

use crate::config::{DisplayMode, MetricBounds, TempUnit};
use crate::error::{PanelError, Result};
use crate::layout::{DigitMap, Layout, LayoutMode, PeerlessLayout};
use crate::metrics::{Device, DeviceUnits, MetricsSnapshot};
use crate::protocol::NUM_LEDS;
use crate::render::color::{self, ColorExpr, DEFAULT_COLOR, FrameInputs, Rgb};
use crate::render::frame::LedFrame;
use crate::render::segments::{BLANK, digit_row_flags, digits_of, letter_h_flags, segments_of};

// =============================================================================
// Constants
// =============================================================================

/// Temperature fields carry three digits.
const TEMP_LIMIT: i32 = 1000;

/// Usage fields carry two digits plus the fixed leading '1' pair.
const USAGE_LIMIT: i32 = 200;

/// Capacity of the small panel's shared three-digit frame.
const DIGIT_FRAME_LIMIT: i32 = 1000;

// =============================================================================
// Frame Output
// =============================================================================

/// One finished frame, ready for packetization.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelFrame {
    pub leds: Vec<u8>,
    pub colors: Vec<Rgb>,
}

/// External inputs for one composition tick.
pub struct ComposeInputs<'a> {
    pub metrics: &'a MetricsSnapshot,
    pub units: DeviceUnits,
    pub now: NaiveTime,
    pub metrics_exprs: &'a [ColorExpr],
    pub time_exprs: &'a [ColorExpr],
    pub bounds: &'a MetricBounds,
}

// =============================================================================
// Composer
// =============================================================================

/// Render state machine over the display modes.
pub struct Composer {
    frame: LedFrame,
    /// Persists across frames; modes overwrite the slices they own.
    colors: Vec<Rgb>,
    layout: Layout,
    peerless: Option<PeerlessLayout>,
    /// Frame counter modulo twice the cycle length. Wraps, never resets.
    cpt: u32,
    cycle_ticks: u32,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            frame: LedFrame::new(),
            colors: vec![DEFAULT_COLOR; NUM_LEDS],
            layout: Layout::big(),
            peerless: None,
            cpt: 0,
            cycle_ticks: 50,
        }
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.layout.mode() != mode {
            self.layout = Layout::for_mode(mode);
        }
    }

    pub fn set_cycle_ticks(&mut self, ticks: u32) {
        self.cycle_ticks = ticks.max(1);
    }

    pub fn set_peerless_layout(&mut self, layout: Option<PeerlessLayout>) {
        self.peerless = layout;
    }

    pub fn cycle_pos(&self) -> u32 {
        self.cpt
    }

    /// Compose one frame for the given mode.
    ///
    /// The cycle counter advances even when composition fails, so
    /// alternating modes keep their phase across skipped frames.
    pub fn compose(&mut self, mode: &DisplayMode, inputs: &ComposeInputs) -> Result<PanelFrame> {
        self.frame.reset();

        let frame_inputs = FrameInputs {
            metrics: inputs.metrics,
            now: inputs.now,
            cycle_pos: self.cpt,
            cycle_ticks: self.cycle_ticks,
            bounds: inputs.bounds,
        };
        let metrics_colors = color::resolve_table(inputs.metrics_exprs, &frame_inputs);
        let time_colors = color::resolve_table(inputs.time_exprs, &frame_inputs);

        let result = self.dispatch(mode, inputs, &metrics_colors, &time_colors);
        self.cpt = (self.cpt + 1) % (self.cycle_ticks * 2);

        result?;
        Ok(PanelFrame {
            leds: self.frame.leds().to_vec(),
            colors: self.colors.clone(),
        })
    }

    fn dispatch(
        &mut self,
        mode: &DisplayMode,
        inputs: &ComposeInputs,
        metrics_colors: &[Rgb],
        time_colors: &[Rgb],
    ) -> Result<()> {
        match mode {
            DisplayMode::Metrics => self.display_metrics(&Device::ALL, inputs, metrics_colors),
            DisplayMode::Time => {
                self.display_time(Device::Cpu, inputs.now, time_colors);
                Ok(())
            }
            DisplayMode::TimeWithSeconds => {
                self.display_time_with_seconds(inputs.now, time_colors);
                Ok(())
            }
            DisplayMode::TimeCpu => {
                self.display_time(Device::Gpu, inputs.now, time_colors);
                self.display_metrics(&[Device::Cpu], inputs, metrics_colors)
            }
            DisplayMode::TimeGpu => {
                self.display_time(Device::Cpu, inputs.now, time_colors);
                self.display_metrics(&[Device::Gpu], inputs, metrics_colors)
            }
            DisplayMode::AlternateTime => {
                if self.cpt < self.cycle_ticks {
                    self.display_time(Device::Cpu, inputs.now, time_colors);
                    self.display_metrics(&[Device::Gpu], inputs, metrics_colors)
                } else {
                    self.display_time(Device::Gpu, inputs.now, time_colors);
                    self.display_metrics(&[Device::Cpu], inputs, metrics_colors)
                }
            }
            DisplayMode::AlternateTimeWithSeconds => {
                if self.cpt < self.cycle_ticks {
                    self.display_time_with_seconds(inputs.now, time_colors);
                    Ok(())
                } else {
                    self.display_metrics(&Device::ALL, inputs, metrics_colors)
                }
            }
            DisplayMode::AlternateMetrics => {
                // Quarter-cycle rotation through the four metrics.
                let ct = self.cycle_ticks;
                if self.cpt < ct / 2 {
                    self.display_temp_small(Device::Cpu, inputs, metrics_colors)
                } else if self.cpt < ct {
                    self.display_temp_small(Device::Gpu, inputs, metrics_colors)
                } else if self.cpt < 3 * ct / 2 {
                    self.display_usage_small(Device::Cpu, inputs, metrics_colors)
                } else {
                    self.display_usage_small(Device::Gpu, inputs, metrics_colors)
                }
            }
            DisplayMode::CpuTemp => self.display_temp_small(Device::Cpu, inputs, metrics_colors),
            DisplayMode::GpuTemp => self.display_temp_small(Device::Gpu, inputs, metrics_colors),
            DisplayMode::CpuUsage => self.display_usage_small(Device::Cpu, inputs, metrics_colors),
            DisplayMode::GpuUsage => self.display_usage_small(Device::Gpu, inputs, metrics_colors),
            DisplayMode::PeerlessStandard => {
                self.display_peerless(inputs, metrics_colors, true, true)
            }
            DisplayMode::PeerlessTemp => self.display_peerless(inputs, metrics_colors, true, false),
            DisplayMode::PeerlessUsage => {
                self.display_peerless(inputs, metrics_colors, false, true)
            }
            DisplayMode::DebugUi => {
                self.frame.fill(1);
                self.colors.copy_from_slice(metrics_colors);
                Ok(())
            }
            DisplayMode::Unknown(name) => {
                warn!("unknown display mode: {}", name);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Big Layout Displays
    // =========================================================================

    fn display_metrics(
        &mut self,
        devices: &[Device],
        inputs: &ComposeInputs,
        metrics_colors: &[Rgb],
    ) -> Result<()> {
        for &device in devices {
            self.frame
                .set_scalar(&self.layout, &format!("{}_led", device), 1);
            self.set_temp(
                inputs.metrics.temp(device),
                device,
                inputs.units.for_device(device),
            )?;
            self.set_usage(inputs.metrics.usage(device), device)?;
            self.copy_colors(device.name(), metrics_colors);
        }
        Ok(())
    }

    /// Light a device's temperature field plus its unit indicator.
    fn set_temp(&mut self, temperature: i32, device: Device, unit: TempUnit) -> Result<()> {
        if temperature >= TEMP_LIMIT {
            return Err(PanelError::ValueOutOfRange {
                field: "temperature",
                value: temperature,
                limit: TEMP_LIMIT,
            });
        }
        let flags = digit_row_flags(&digits_of(temperature, 3, BLANK));
        self.frame
            .set_flags(&self.layout, &format!("{}_temp", device), &flags);
        self.frame.set_scalar(
            &self.layout,
            &format!("{}_{}", device, unit.region_name()),
            1,
        );
        Ok(())
    }

    /// Light a device's usage field: overflow pair, two digits, percent LED.
    fn set_usage(&mut self, usage: i32, device: Device) -> Result<()> {
        if usage >= USAGE_LIMIT {
            return Err(PanelError::ValueOutOfRange {
                field: "usage",
                value: usage,
                limit: USAGE_LIMIT,
            });
        }
        let over = (usage >= 100) as u8;
        let mut flags = vec![over, over];
        flags.extend(digit_row_flags(&digits_of(usage, 2, BLANK)));
        self.frame
            .set_flags(&self.layout, &format!("{}_usage", device), &flags);
        self.frame
            .set_scalar(&self.layout, &format!("{}_percent_led", device), 1);
        Ok(())
    }

    fn display_time(&mut self, device: Device, now: NaiveTime, time_colors: &[Rgb]) {
        let mut temp_flags = digit_row_flags(&digits_of(now.hour() as i32, 2, 0));
        temp_flags.extend(letter_h_flags());
        self.frame
            .set_flags(&self.layout, &format!("{}_temp", device), &temp_flags);

        let mut usage_flags = vec![0, 0];
        usage_flags.extend(digit_row_flags(&digits_of(now.minute() as i32, 2, 0)));
        self.frame
            .set_flags(&self.layout, &format!("{}_usage", device), &usage_flags);

        self.copy_colors(device.name(), time_colors);
    }

    fn display_time_with_seconds(&mut self, now: NaiveTime, time_colors: &[Rgb]) {
        let mut temp_flags = digit_row_flags(&digits_of(now.hour() as i32, 2, 0));
        temp_flags.extend(letter_h_flags());
        self.frame.set_flags(&self.layout, "cpu_temp", &temp_flags);

        let mut minute_flags = vec![0, 0];
        minute_flags.extend(digit_row_flags(&digits_of(now.minute() as i32, 2, 0)));
        self.frame
            .set_flags(&self.layout, "cpu_usage", &minute_flags);

        let mut second_flags = vec![0, 0];
        second_flags.extend(digit_row_flags(&digits_of(now.second() as i32, 2, 0)));
        self.frame
            .set_flags(&self.layout, "gpu_usage", &second_flags);

        self.colors.copy_from_slice(time_colors);
    }

    // =========================================================================
    // Small Layout Displays
    // =========================================================================

    fn display_temp_small(
        &mut self,
        device: Device,
        inputs: &ComposeInputs,
        metrics_colors: &[Rgb],
    ) -> Result<()> {
        let unit = inputs.units.for_device(device);
        self.frame.set_scalar(&self.layout, unit.region_name(), 1);
        self.frame
            .set_scalar(&self.layout, &format!("{}_led", device), 1);
        self.colors.copy_from_slice(metrics_colors);

        let temperature = inputs.metrics.temp(device);
        if temperature >= DIGIT_FRAME_LIMIT {
            return Err(PanelError::ValueOutOfRange {
                field: "temperature",
                value: temperature,
                limit: DIGIT_FRAME_LIMIT,
            });
        }
        let flags = digit_row_flags(&digits_of(temperature, 3, 0));
        self.frame.set_flags(&self.layout, "digit_frame", &flags);
        Ok(())
    }

    fn display_usage_small(
        &mut self,
        device: Device,
        inputs: &ComposeInputs,
        metrics_colors: &[Rgb],
    ) -> Result<()> {
        self.frame.set_scalar(&self.layout, "percent_led", 1);
        self.frame
            .set_scalar(&self.layout, &format!("{}_led", device), 1);
        self.colors.copy_from_slice(metrics_colors);

        let usage = inputs.metrics.usage(device);
        if usage >= DIGIT_FRAME_LIMIT {
            return Err(PanelError::ValueOutOfRange {
                field: "usage",
                value: usage,
                limit: DIGIT_FRAME_LIMIT,
            });
        }
        let flags = digit_row_flags(&digits_of(usage, 3, 0));
        self.frame.set_flags(&self.layout, "digit_frame", &flags);
        Ok(())
    }

    // =========================================================================
    // Peerless Displays (layout-file driven)
    // =========================================================================

    fn display_peerless(
        &mut self,
        inputs: &ComposeInputs,
        metrics_colors: &[Rgb],
        with_temp: bool,
        with_usage: bool,
    ) -> Result<()> {
        let Some(peerless) = self.peerless.as_ref() else {
            warn!("layout file not loaded, cannot render peerless display");
            return Ok(());
        };

        self.colors.copy_from_slice(metrics_colors);

        for device in Device::ALL {
            let side = peerless.device(device);

            if with_temp {
                let temperature = inputs.metrics.temp(device);
                if temperature >= TEMP_LIMIT {
                    return Err(PanelError::ValueOutOfRange {
                        field: "temperature",
                        value: temperature,
                        limit: TEMP_LIMIT,
                    });
                }
                draw_digits(&mut self.frame, temperature, side.temp_digits);
                let unit_led = match inputs.units.for_device(device) {
                    TempUnit::Celsius => side.celsius,
                    TempUnit::Fahrenheit => side.fahrenheit,
                };
                self.frame.light(unit_led);
            }

            if with_usage {
                let usage = inputs.metrics.usage(device);
                if usage >= USAGE_LIMIT {
                    return Err(PanelError::ValueOutOfRange {
                        field: "usage",
                        value: usage,
                        limit: USAGE_LIMIT,
                    });
                }
                draw_digits(&mut self.frame, usage % 100, side.usage_digits);
                if usage >= 100 {
                    self.frame.light(side.usage_1.top);
                    self.frame.light(side.usage_1.bottom);
                }
                self.frame.light(side.percent);
            }

            for &led in side.led {
                self.frame.light(led);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Copy one device's slice of a resolved color table into the persistent
    /// color buffer.
    fn copy_colors(&mut self, region: &str, source: &[Rgb]) {
        let Some(indexes) = self.layout.region(region) else {
            warn!("region '{}' not found in the active layout", region);
            return;
        };
        for &i in indexes {
            self.colors[i] = source[i];
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Light a number's segments through per-digit segment maps, most
/// significant digit first.
fn draw_digits(frame: &mut LedFrame, value: i32, maps: &[DigitMap]) {
    let digits = digits_of(value, maps.len(), 0);
    for (digit, map) in digits.iter().zip(maps) {
        if (0..=9).contains(digit) {
            for &segment in segments_of(*digit as u8) {
                frame.light(map.map.index_of(segment));
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{OverflowPair, SegmentMap};
    use crate::render::segments::digit_flags;

    fn literal_table(hex: &str) -> Vec<ColorExpr> {
        vec![ColorExpr::Literal(Rgb::from_hex(hex).unwrap()); NUM_LEDS]
    }

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_temp: 42,
            cpu_usage: 57,
            gpu_temp: 65,
            gpu_usage: 99,
        }
    }

    fn compose_one(
        composer: &mut Composer,
        mode: &DisplayMode,
        metrics: &MetricsSnapshot,
    ) -> Result<PanelFrame> {
        let metrics_exprs = literal_table("ff0000");
        let time_exprs = literal_table("00ff00");
        let bounds = MetricBounds::default();
        let inputs = ComposeInputs {
            metrics,
            units: DeviceUnits::default(),
            now: NaiveTime::from_hms_opt(13, 37, 9).unwrap(),
            metrics_exprs: &metrics_exprs,
            time_exprs: &time_exprs,
            bounds: &bounds,
        };
        composer.compose(mode, &inputs)
    }

    fn region_flags(frame: &PanelFrame, layout: &Layout, name: &str) -> Vec<u8> {
        layout
            .region(name)
            .unwrap()
            .iter()
            .map(|&i| frame.leds[i])
            .collect()
    }

    #[test]
    fn test_metrics_mode_lights_expected_segments() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let frame = compose_one(&mut composer, &DisplayMode::Metrics, &metrics).unwrap();
        let layout = Layout::big();

        // cpu_temp 42 renders as [blank, 4, 2].
        let expected: Vec<u8> = [digit_flags(BLANK), digit_flags(4), digit_flags(2)]
            .concat();
        assert_eq!(region_flags(&frame, &layout, "cpu_temp"), expected);

        // cpu_usage 57: overflow pair unset, digits [5, 7].
        let mut expected = vec![0, 0];
        expected.extend(digit_flags(5));
        expected.extend(digit_flags(7));
        assert_eq!(region_flags(&frame, &layout, "cpu_usage"), expected);

        assert_eq!(region_flags(&frame, &layout, "cpu_led"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "cpu_percent_led"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "cpu_celsius"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "cpu_fahrenheit"), vec![0]);

        // Metrics colors cover both device halves.
        assert!(frame.colors.iter().all(|c| c.to_hex() == "ff0000"));
    }

    #[test]
    fn test_usage_overflow_pair() {
        let mut composer = Composer::new();
        let mut metrics = snapshot();
        metrics.gpu_usage = 143;
        let frame = compose_one(&mut composer, &DisplayMode::Metrics, &metrics).unwrap();
        let layout = Layout::big();

        let mut expected = vec![1, 1];
        expected.extend(digit_flags(4));
        expected.extend(digit_flags(3));
        assert_eq!(region_flags(&frame, &layout, "gpu_usage"), expected);
    }

    #[test]
    fn test_out_of_range_values_abort_the_frame() {
        let mut composer = Composer::new();
        let mut metrics = snapshot();
        metrics.cpu_temp = 1000;
        let result = compose_one(&mut composer, &DisplayMode::Metrics, &metrics);
        assert!(matches!(
            result,
            Err(PanelError::ValueOutOfRange {
                field: "temperature",
                ..
            })
        ));

        let mut metrics = snapshot();
        metrics.cpu_usage = 200;
        let result = compose_one(&mut composer, &DisplayMode::Metrics, &metrics);
        assert!(matches!(
            result,
            Err(PanelError::ValueOutOfRange { field: "usage", .. })
        ));
    }

    #[test]
    fn test_time_mode_draws_hours_and_minutes() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let frame = compose_one(&mut composer, &DisplayMode::Time, &metrics).unwrap();
        let layout = Layout::big();

        // 13:37 → hour digits [1, 3] plus the 'H' glyph.
        let mut expected: Vec<u8> = [digit_flags(1), digit_flags(3)].concat();
        expected.extend(letter_h_flags());
        assert_eq!(region_flags(&frame, &layout, "cpu_temp"), expected);

        let mut expected = vec![0, 0];
        expected.extend(digit_flags(3));
        expected.extend(digit_flags(7));
        assert_eq!(region_flags(&frame, &layout, "cpu_usage"), expected);

        // Time colors only cover the device showing the time.
        let cpu = layout.region("cpu").unwrap();
        assert!(cpu.iter().all(|&i| frame.colors[i].to_hex() == "00ff00"));
        let gpu = layout.region("gpu").unwrap();
        assert!(gpu.iter().all(|&i| frame.colors[i].to_hex() != "00ff00"));
    }

    #[test]
    fn test_time_with_seconds_uses_gpu_usage_field() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let frame =
            compose_one(&mut composer, &DisplayMode::TimeWithSeconds, &metrics).unwrap();
        let layout = Layout::big();

        let mut expected = vec![0, 0];
        expected.extend(digit_flags(0));
        expected.extend(digit_flags(9));
        assert_eq!(region_flags(&frame, &layout, "gpu_usage"), expected);

        // Full time color table.
        assert!(frame.colors.iter().all(|c| c.to_hex() == "00ff00"));
    }

    #[test]
    fn test_alternate_time_swaps_each_half_cycle() {
        let mut composer = Composer::new();
        composer.set_cycle_ticks(1);
        let metrics = snapshot();
        let layout = Layout::big();

        // First half: time on CPU (H glyph lit), metrics on GPU.
        let frame = compose_one(&mut composer, &DisplayMode::AlternateTime, &metrics).unwrap();
        let cpu_temp = region_flags(&frame, &layout, "cpu_temp");
        assert_eq!(cpu_temp[14..], letter_h_flags()[..]);

        // Second half: swapped.
        let frame = compose_one(&mut composer, &DisplayMode::AlternateTime, &metrics).unwrap();
        let gpu_temp = region_flags(&frame, &layout, "gpu_temp");
        assert_eq!(gpu_temp[14..], letter_h_flags()[..]);
        let cpu_led = region_flags(&frame, &layout, "cpu_led");
        assert_eq!(cpu_led, vec![1]);
    }

    #[test]
    fn test_alternate_metrics_rotates_quarters() {
        let mut composer = Composer::new();
        composer.set_layout_mode(LayoutMode::Small);
        composer.set_cycle_ticks(2);
        let metrics = snapshot();
        let layout = Layout::small();

        // Quarters: cpu temp, gpu temp, cpu usage, gpu usage.
        let frame =
            compose_one(&mut composer, &DisplayMode::AlternateMetrics, &metrics).unwrap();
        assert_eq!(region_flags(&frame, &layout, "cpu_led"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "celsius"), vec![1]);

        let frame =
            compose_one(&mut composer, &DisplayMode::AlternateMetrics, &metrics).unwrap();
        assert_eq!(region_flags(&frame, &layout, "gpu_led"), vec![1]);

        let frame =
            compose_one(&mut composer, &DisplayMode::AlternateMetrics, &metrics).unwrap();
        assert_eq!(region_flags(&frame, &layout, "cpu_led"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "percent_led"), vec![1]);

        let frame =
            compose_one(&mut composer, &DisplayMode::AlternateMetrics, &metrics).unwrap();
        assert_eq!(region_flags(&frame, &layout, "gpu_led"), vec![1]);
        assert_eq!(region_flags(&frame, &layout, "percent_led"), vec![1]);
    }

    #[test]
    fn test_small_static_mode_draws_digit_frame() {
        let mut composer = Composer::new();
        composer.set_layout_mode(LayoutMode::Small);
        let metrics = snapshot();
        let frame = compose_one(&mut composer, &DisplayMode::GpuUsage, &metrics).unwrap();
        let layout = Layout::small();

        // gpu_usage 99 fills the frame as [0, 9, 9].
        let expected: Vec<u8> = [digit_flags(0), digit_flags(9), digit_flags(9)].concat();
        assert_eq!(region_flags(&frame, &layout, "digit_frame"), expected);
    }

    #[test]
    fn test_debug_ui_lights_everything() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let frame = compose_one(&mut composer, &DisplayMode::DebugUi, &metrics).unwrap();
        assert!(frame.leds.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_unknown_mode_renders_blank() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let mode = DisplayMode::Unknown("plasma".into());
        let frame = compose_one(&mut composer, &mode, &metrics).unwrap();
        assert!(frame.leds.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_cycle_counter_wraps() {
        let mut composer = Composer::new();
        composer.set_cycle_ticks(2);
        let metrics = snapshot();
        for _ in 0..4 {
            compose_one(&mut composer, &DisplayMode::Metrics, &metrics).unwrap();
        }
        assert_eq!(composer.cycle_pos(), 0);
    }

    fn sequential_segment_map(base: usize) -> DigitMap {
        DigitMap {
            map: SegmentMap {
                a: base,
                b: base + 1,
                c: base + 2,
                d: base + 3,
                e: base + 4,
                f: base + 5,
                g: base + 6,
            },
        }
    }

    fn test_peerless_layout() -> PeerlessLayout {
        PeerlessLayout {
            cpu_temp_digits: (0..3).map(|i| sequential_segment_map(i * 7)).collect(),
            cpu_celsius: 21,
            cpu_fahrenheit: 22,
            cpu_usage_digits: (0..2).map(|i| sequential_segment_map(23 + i * 7)).collect(),
            cpu_usage_1: OverflowPair { top: 37, bottom: 38 },
            cpu_percent: 39,
            cpu_led: vec![40],
            gpu_temp_digits: (0..3).map(|i| sequential_segment_map(50 + i * 7)).collect(),
            gpu_celsius: 71,
            gpu_fahrenheit: 72,
            gpu_usage_digits: (0..2).map(|i| sequential_segment_map(73 + i * 7)).collect(),
            gpu_usage_1: OverflowPair { top: 87, bottom: 88 },
            gpu_percent: 89,
            gpu_led: vec![90],
        }
    }

    #[test]
    fn test_peerless_standard_draws_from_layout_file() {
        let mut composer = Composer::new();
        composer.set_peerless_layout(Some(test_peerless_layout()));
        let metrics = snapshot();
        let frame =
            compose_one(&mut composer, &DisplayMode::PeerlessStandard, &metrics).unwrap();

        // cpu_temp 42 → second digit is 4 = segments f,g,b,c at indexes 7..14.
        // Leading zero-padded digit 0 occupies 0..7.
        assert_eq!(frame.leds[12], 1); // f
        assert_eq!(frame.leds[13], 1); // g
        assert_eq!(frame.leds[8], 1); // b
        assert_eq!(frame.leds[9], 1); // c
        assert_eq!(frame.leds[7], 0); // a off for digit 4

        // Unit, percent and device indicators.
        assert_eq!(frame.leds[21], 1);
        assert_eq!(frame.leds[39], 1);
        assert_eq!(frame.leds[40], 1);

        // cpu_usage 57 < 100: overflow pair stays off.
        assert_eq!(frame.leds[37], 0);
        assert_eq!(frame.leds[38], 0);
    }

    #[test]
    fn test_peerless_without_layout_is_blank() {
        let mut composer = Composer::new();
        let metrics = snapshot();
        let frame =
            compose_one(&mut composer, &DisplayMode::PeerlessStandard, &metrics).unwrap();
        assert!(frame.leds.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_peerless_usage_overflow() {
        let mut composer = Composer::new();
        composer.set_peerless_layout(Some(test_peerless_layout()));
        let mut metrics = snapshot();
        metrics.cpu_usage = 104;
        let frame =
            compose_one(&mut composer, &DisplayMode::PeerlessUsage, &metrics).unwrap();

        assert_eq!(frame.leds[37], 1);
        assert_eq!(frame.leds[38], 1);
        // No temperature digits in usage-only mode.
        assert_eq!(frame.leds[21], 0);
    }
}
