//! Segment panel device handle.
//!
//! Thin wrapper over `hidapi` for opening the panel by vendor/product id and
//! writing frame packets. The panel is write-only: it never reports status
//! back over HID.

use hidapi::{HidApi, HidDevice};

use crate::error::{PanelError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Default USB vendor id of the panel.
pub const DEFAULT_VENDOR_ID: u16 = 0x0416;

/// Default USB product id of the panel.
pub const DEFAULT_PRODUCT_ID: u16 = 0x8001;

// =============================================================================
// SegmentPanel
// =============================================================================

/// Open handle to a connected segment panel.
///
/// # Example
///
/// ```no_run
/// use digital_lcd_rust::device::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, SegmentPanel};
///
/// let panel = SegmentPanel::open(DEFAULT_VENDOR_ID, DEFAULT_PRODUCT_ID)?;
/// # Ok::<(), digital_lcd_rust::error::PanelError>(())
/// ```
pub struct SegmentPanel {
    device: HidDevice,
    vendor_id: u16,
    product_id: u16,
}

impl SegmentPanel {
    /// Open the first panel matching the given ids.
    ///
    /// # Errors
    /// Returns `DeviceNotFound` if no matching device is connected.
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self> {
        let api = HidApi::new().map_err(PanelError::HidError)?;

        for info in api.device_list() {
            if info.vendor_id() == vendor_id && info.product_id() == product_id {
                let device = info.open_device(&api).map_err(PanelError::HidError)?;
                return Ok(Self {
                    device,
                    vendor_id,
                    product_id,
                });
            }
        }

        Err(PanelError::DeviceNotFound {
            vendor_id,
            product_id,
        })
    }

    /// List all connected panels matching the given ids.
    ///
    /// Returns a vector of (path, serial_number) tuples.
    pub fn list_devices(vendor_id: u16, product_id: u16) -> Result<Vec<(String, Option<String>)>> {
        let api = HidApi::new().map_err(PanelError::HidError)?;

        let devices: Vec<_> = api
            .device_list()
            .filter(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
            .map(|info| {
                (
                    info.path().to_string_lossy().into_owned(),
                    info.serial_number().map(String::from),
                )
            })
            .collect();

        Ok(devices)
    }

    /// Write one frame's packets to the device, in order.
    pub fn send_frame(&self, packets: &[Vec<u8>]) -> Result<()> {
        for packet in packets {
            self.device.write(packet).map_err(PanelError::HidError)?;
        }
        Ok(())
    }

    /// The ids this handle was opened with.
    pub fn ids(&self) -> (u16, u16) {
        (self.vendor_id, self.product_id)
    }
}

impl std::fmt::Debug for SegmentPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentPanel")
            .field("vendor_id", &format_args!("{:#06x}", self.vendor_id))
            .field("product_id", &format_args!("{:#06x}", self.product_id))
            .finish_non_exhaustive()
    }
}
