//! epaper-render: Headless cairo rendering for e-paper displays.
//!
//! Widgets draw onto a [`Canvas`] (an RGB cairo image surface). The finished
//! canvas is quantised into a palette-indexed [`RasterImage`], rotated, diffed
//! against the previous frame and encoded as an indexed PNG.

pub mod canvas;
pub mod chart;
pub mod pango_text;
pub mod png_codec;
pub mod raster;
pub mod resources;

pub use canvas::{fill_rect, set_source_color, Canvas};
pub use chart::{render_line_chart, LineChart};
pub use pango_text::{show_text_at, show_text_centered, text_extents, FontCache, TextExtents};
pub use png_codec::{decode_indexed, encode_indexed};
pub use raster::{BoundingBox, RasterImage};
pub use resources::RenderResources;
