//! The render pipeline: digit encoding, LED state, colors and composition.

pub mod color;
pub mod composer;
pub mod frame;
pub mod segments;

pub use color::{ColorExpr, Rgb};
pub use composer::{ComposeInputs, Composer, PanelFrame};
pub use frame::LedFrame;
