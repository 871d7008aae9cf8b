//! Painting: the dirty-driven [`Painter`](painter::Painter), its raster and vector
//! backends, PNG export, and the frame queue that schedules repaints.

pub mod backend;
pub mod export;
pub mod painter;
pub mod raster;
pub mod scheduler;
pub mod surface;
pub mod svg_doc;
pub mod text;
pub mod vector;
