//! Text Engine - Text measurement service for equation layout
//!
//! The equation engine never computes glyph metrics itself. Everything it
//! needs to know about a piece of text (advance width, line height, ink
//! extent, baseline, overhangs) comes from a [`TextMeasurer`].
//!
//! # Modules
//!
//! - `font`: Font descriptors (font type, style, weight, size request)
//! - `metrics`: Measured extents and metric helpers
//! - `measurer`: The measurement trait and a deterministic approximate measurer
//! - `shaper`: A measurer that shapes text with rustybuzz

mod error;
mod font;
mod measurer;
mod metrics;
mod shaper;

pub use error::*;
pub use font::*;
pub use measurer::*;
pub use metrics::*;
pub use shaper::*;
