//! Navigate a rendered graph SVG: index node geometry, frame nodes in a
//! planar zoomable viewport and jump between them by label.

pub mod error;
pub mod geometry;
pub mod index;
pub mod nav;
pub mod render;
pub mod selector;
pub mod svg;
pub mod viewport;

pub use error::{NavError, Result};
pub use index::NodeIndex;
pub use nav::{build_index, initialize, NavConfig, NavContext};
pub use selector::Selector;
pub use viewport::{Camera, Flight, View, Viewport, ViewportOptions};
