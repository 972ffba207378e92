//! # Droplet Geometry
//!
//! Points, rectangles and closed polygonal paths used by the layout engine
//! for bounds math, hit-testing and drawing.
//!
//! Nothing here rasterizes. Drawing goes through the [`Drawable`] surface
//! trait, and text widths come from a [`TextMetrics`] implementation.

mod color;
mod path;
mod point;
mod rectangle;
mod surface;

pub use color::Color;
pub use path::{Path, PathStyle};
pub use point::Point;
pub use rectangle::Rectangle;
pub use surface::{DrawCommand, Drawable, MonospaceMetrics, RecordingSurface, TextMetrics};
