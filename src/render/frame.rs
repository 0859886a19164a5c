//! LED state buffer for one rendered frame.
//!
//! Holds one on/off flag per physical LED, indexed through the active
//! layout's named regions. The buffer is cleared at the start of every frame
//! and never persists between ticks.

use log::warn;

use crate::layout::Layout;
use crate::protocol::NUM_LEDS;

/// On/off flags for the full panel, insertion order = wiring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedFrame {
    leds: Vec<u8>,
}

impl LedFrame {
    /// Create an all-off frame of exactly [`NUM_LEDS`] entries.
    pub fn new() -> Self {
        Self {
            leds: vec![0; NUM_LEDS],
        }
    }

    /// Zero every entry.
    pub fn reset(&mut self) {
        self.leds.fill(0);
    }

    /// Set every entry to `value` (used by the debug display).
    pub fn fill(&mut self, value: u8) {
        self.leds.fill(value);
    }

    /// Broadcast a single flag to every LED of a named region.
    ///
    /// An unknown region name is a warning and a no-op, never fatal.
    pub fn set_scalar(&mut self, layout: &Layout, name: &str, value: u8) {
        match layout.region(name) {
            Some(indexes) => {
                for &i in indexes {
                    self.leds[i] = value;
                }
            }
            None => warn!("region '{}' not found in the active layout", name),
        }
    }

    /// Assign flags element-wise to a named region.
    ///
    /// The flag count must match the region's index count; a mismatch is a
    /// caller bug, not validated defensively.
    pub fn set_flags(&mut self, layout: &Layout, name: &str, flags: &[u8]) {
        match layout.region(name) {
            Some(indexes) => {
                debug_assert_eq!(
                    indexes.len(),
                    flags.len(),
                    "flag count does not match region '{}'",
                    name
                );
                for (&i, &flag) in indexes.iter().zip(flags) {
                    self.leds[i] = flag;
                }
            }
            None => warn!("region '{}' not found in the active layout", name),
        }
    }

    /// Turn on a single LED by physical index (layout-file driven paths).
    pub fn light(&mut self, index: usize) {
        debug_assert!(index < NUM_LEDS, "LED index {} out of range", index);
        if let Some(led) = self.leds.get_mut(index) {
            *led = 1;
        }
    }

    /// All flags, in wiring order.
    pub fn leds(&self) -> &[u8] {
        &self.leds
    }
}

impl Default for LedFrame {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    #[test]
    fn test_new_frame_is_all_off() {
        let frame = LedFrame::new();
        assert_eq!(frame.leds().len(), NUM_LEDS);
        assert!(frame.leds().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_set_scalar_broadcasts() {
        let layout = Layout::big();
        let mut frame = LedFrame::new();
        frame.set_scalar(&layout, "cpu_led", 1);
        let indexes = layout.region("cpu_led").unwrap();
        for &i in indexes {
            assert_eq!(frame.leds()[i], 1);
        }
    }

    #[test]
    fn test_set_flags_elementwise() {
        let layout = Layout::small();
        let mut frame = LedFrame::new();
        let mut flags = vec![0u8; 21];
        flags[0] = 1;
        flags[20] = 1;
        frame.set_flags(&layout, "digit_frame", &flags);

        let indexes = layout.region("digit_frame").unwrap();
        assert_eq!(frame.leds()[indexes[0]], 1);
        assert_eq!(frame.leds()[indexes[10]], 0);
        assert_eq!(frame.leds()[indexes[20]], 1);
    }

    #[test]
    fn test_unknown_region_is_noop() {
        let layout = Layout::big();
        let mut frame = LedFrame::new();
        frame.set_scalar(&layout, "no_such_region", 1);
        assert!(frame.leds().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut frame = LedFrame::new();
        frame.fill(1);
        assert!(frame.leds().iter().all(|&l| l == 1));
        frame.reset();
        assert!(frame.leds().iter().all(|&l| l == 0));
    }
}
