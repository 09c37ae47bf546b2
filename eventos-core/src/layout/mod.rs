//! Masonry layout for event cards.
//!
//! Cards have a fixed width and a height that is only known once they have
//! been rendered. [`MasonryLayout`] assigns each card a column and a vertical
//! offset, always filling the currently shortest column, and answers
//! viewport queries so that only visible cards need to be rendered.

mod masonry;
mod viewport;

pub use masonry::{DEFAULT_ESTIMATED_HEIGHT, MasonryLayout, Placement, Relayout};
pub use viewport::{Cell, Viewport, VisibleCells};
