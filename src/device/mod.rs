//! Device abstraction layer for the segment panel.
//!
//! Provides HID discovery and the write sink the render loop feeds.

pub mod panel;

pub use panel::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, SegmentPanel};
