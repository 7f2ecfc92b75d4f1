pub mod geometry;
pub mod types;

pub use geometry::{Point, Rect, Size};
pub use types::*;
