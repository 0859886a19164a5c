//! Custom error types for the segment panel driver.
//!
//! This module provides fine-grained error handling for device communication,
//! frame encoding, and configuration validation.

use thiserror::Error;

/// Main error type for panel operations.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Device not found during enumeration.
    #[error(
        "Segment panel not found (vendor {vendor_id:#06x}, product {product_id:#06x}). \
         Check USB connection and permissions."
    )]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// HID communication error.
    #[error("HID communication error: {0}")]
    HidError(#[from] hidapi::HidError),

    /// Numeric value exceeds the digit capacity of its display field.
    #[error("Value {value} does not fit the {field} field (must be below {limit})")]
    ValueOutOfRange {
        field: &'static str,
        value: i32,
        limit: i32,
    },

    /// Color expression string could not be parsed.
    #[error("Invalid color expression '{expr}': {reason}")]
    InvalidColorExpr { expr: String, reason: String },

    /// Configuration file is missing or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Layout file is missing or malformed.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

/// Result type alias for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;
