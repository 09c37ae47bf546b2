//! Viewport queries over a computed layout.

use crate::event::EventId;
use crate::layout::Placement;

/// The scrolled window onto the layout.
///
/// `overscan` extends the window on both sides so that cards just outside
/// it are already rendered when scrolling starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub height: f32,
    pub overscan: f32,
}

impl Viewport {
    pub fn new(scroll_top: f32, height: f32) -> Self {
        Viewport {
            scroll_top: scroll_top.max(0.0),
            height: height.max(0.0),
            overscan: 0.0,
        }
    }

    pub fn with_overscan(mut self, overscan: f32) -> Self {
        self.overscan = overscan.max(0.0);
        self
    }

    /// Vertical range covered, overscan included.
    pub fn range(&self) -> (f32, f32) {
        (
            self.scroll_top - self.overscan,
            self.scroll_top + self.height + self.overscan,
        )
    }

    pub fn intersects(&self, placement: &Placement) -> bool {
        let (top, bottom) = self.range();
        placement.top < bottom && placement.bottom() > top
    }
}

/// A card to render: its position in the roster, its id and where it goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub index: usize,
    pub id: EventId,
    pub placement: Placement,
}

/// Lazy iterator over the cells intersecting a viewport, in roster order.
///
/// A clone continues from the same cursor. Calling
/// [`MasonryLayout::visible`](crate::layout::MasonryLayout::visible) again
/// starts over from the current layout.
#[derive(Debug, Clone)]
pub struct VisibleCells<'a> {
    ids: &'a [EventId],
    placements: &'a [Placement],
    viewport: Viewport,
    next: usize,
}

impl<'a> VisibleCells<'a> {
    pub(crate) fn new(ids: &'a [EventId], placements: &'a [Placement], viewport: Viewport) -> Self {
        VisibleCells {
            ids,
            placements,
            viewport,
            next: 0,
        }
    }
}

impl Iterator for VisibleCells<'_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        while self.next < self.placements.len() {
            let index = self.next;
            self.next += 1;

            let placement = self.placements[index];
            if self.viewport.intersects(&placement) {
                return Some(Cell {
                    index,
                    id: self.ids[index],
                    placement,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.placements.len() - self.next))
    }
}
