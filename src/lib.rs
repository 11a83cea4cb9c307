//! Filterer — a small per-pixel image filter engine.
//!
//! A decoded RGBA8 bitmap is wrapped in a [`PixelBuffer`], handed to an
//! [`ImageProcessor`], and pushed through one [`Filter`] or an ordered chain
//! of them.  Filters can be built directly or resolved from their names
//! (`"red"`, `"grayscale"`, ...), which is how presets persist them.

#[macro_use]
pub mod logger;
pub mod cli;
pub mod io;
pub mod ops;
pub mod pixels;
pub mod preset;

pub use ops::filters::{Filter, FilterKind};
pub use ops::processor::{FilterError, ImageProcessor};
pub use ops::registry::{FILTER_NAMES, FilterSpec, filter_by_name};
pub use pixels::{Pixel, PixelBuffer};
pub use preset::{Preset, PresetError, PresetStep};
