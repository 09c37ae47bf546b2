use std::collections::HashMap;

use crate::event::{Event, EventId};
use crate::layout::{Viewport, VisibleCells};
use crate::roster::{RosterChange, RosterStore};

/// Height assumed for a card that has not been measured yet.
pub const DEFAULT_ESTIMATED_HEIGHT: f32 = 300.0;

/// Where one card sits in the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub column: usize,
    pub left: f32,
    pub top: f32,
    pub height: f32,
    /// `false` while `height` is still the estimate.
    pub measured: bool,
}

impl Placement {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// What a layout update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relayout {
    /// Every placement is as it was.
    Unchanged,
    /// Placements before this index were kept, the rest recomputed.
    From(usize),
    /// Everything was recomputed.
    Full,
}

/// Greedy column-balanced placement with dirty-prefix tracking.
///
/// A card's placement depends only on the cards before it, so any change
/// (new roster, corrected height) re-places from the first affected index
/// and leaves the prefix alone.
#[derive(Debug, Clone)]
pub struct MasonryLayout {
    column_width: f32,
    gutter: f32,
    estimated_height: f32,
    column_count: usize,

    /// Card ids in roster order
    ids: Vec<EventId>,
    positions: HashMap<EventId, usize>,

    /// Records the placements were computed from, to spot changed cards
    records: Vec<Event>,

    /// Heights reported by `measure`, kept across roster replacements while
    /// the card's content stays the same
    measured: HashMap<EventId, f32>,

    placements: Vec<Placement>,

    /// Roster version the ids were last synced from
    synced_version: Option<u64>,
}

impl MasonryLayout {
    pub fn new(column_width: f32, gutter: f32) -> Self {
        MasonryLayout {
            column_width: sanitize(column_width).max(1.0),
            gutter: sanitize(gutter),
            estimated_height: DEFAULT_ESTIMATED_HEIGHT,
            column_count: 1,
            ids: Vec::new(),
            positions: HashMap::new(),
            records: Vec::new(),
            measured: HashMap::new(),
            placements: Vec::new(),
            synced_version: None,
        }
    }

    pub fn with_estimated_height(mut self, height: f32) -> Self {
        self.estimated_height = sanitize(height);
        self
    }

    /// Fit as many columns as the container allows (at least one).
    pub fn set_container_width(&mut self, width: f32) -> Relayout {
        let count = ((sanitize(width) + self.gutter) / (self.column_width + self.gutter)).floor();
        let count = (count as usize).max(1);

        if count == self.column_count {
            return Relayout::Unchanged;
        }

        tracing::trace!(from = self.column_count, to = count, "column count changed");
        self.column_count = count;
        self.place_from(0);
        Relayout::Full
    }

    /// Bring the layout in line with the roster.
    ///
    /// Uses the roster version to skip work: an unchanged version is a no-op,
    /// a single membership patch moves nothing. Otherwise placements are kept
    /// for the longest unchanged run of cards at the front. A card whose
    /// content changed loses its measured height and is re-placed with the
    /// estimate until it is measured again.
    pub fn sync(&mut self, roster: &RosterStore) -> Relayout {
        let version = roster.version();

        match self.synced_version {
            Some(synced) if synced == version => return Relayout::Unchanged,
            Some(synced) if synced + 1 == version && matches!(roster.last_change(), RosterChange::Patched(_)) => {
                self.synced_version = Some(version);
                return Relayout::Unchanged;
            }
            _ => {}
        }
        self.synced_version = Some(version);

        let events = roster.all();
        let kept = self
            .records
            .iter()
            .zip(events)
            .take_while(|(old, new)| same_card(old, new))
            .count();

        if kept == self.records.len() && kept == events.len() {
            return Relayout::Unchanged;
        }

        let had_items = !self.ids.is_empty();
        let previous: HashMap<EventId, Event> = std::mem::replace(&mut self.records, events.to_vec())
            .into_iter()
            .map(|event| (event.id, event))
            .collect();

        self.ids = events.iter().map(|e| e.id).collect();
        self.positions = self.ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let (records, positions) = (&self.records, &self.positions);
        self.measured.retain(|id, _| {
            let current = positions.get(id).map(|&i| &records[i]);
            matches!((previous.get(id), current), (Some(old), Some(new)) if same_card(old, new))
        });
        self.place_from(kept);

        tracing::trace!(version, kept, total = self.ids.len(), "layout synced");
        if kept == 0 && had_items {
            Relayout::Full
        } else {
            Relayout::From(kept)
        }
    }

    /// Record the rendered height of a card, replacing its estimate.
    pub fn measure(&mut self, id: EventId, height: f32) -> Relayout {
        let height = sanitize(height);
        let Some(&index) = self.positions.get(&id) else {
            return Relayout::Unchanged;
        };

        self.measured.insert(id, height);

        let placement = &mut self.placements[index];
        if placement.height == height {
            placement.measured = true;
            return Relayout::Unchanged;
        }

        self.place_from(index);
        Relayout::From(index)
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    pub fn gutter(&self) -> f32 {
        self.gutter
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, id: EventId) -> Option<&Placement> {
        self.positions.get(&id).map(|&i| &self.placements[i])
    }

    pub fn is_measured(&self, id: EventId) -> bool {
        self.measured.contains_key(&id)
    }

    /// Height of the tallest column: the scroll extent to reserve.
    pub fn total_height(&self) -> f32 {
        self.placements.iter().map(Placement::bottom).fold(0.0, f32::max)
    }

    /// Width taken by the columns actually in use.
    pub fn total_width(&self) -> f32 {
        let columns = self.column_count as f32;
        columns * self.column_width + (columns - 1.0) * self.gutter
    }

    /// Cards intersecting `viewport`, lazily, in roster order.
    pub fn visible(&self, viewport: Viewport) -> VisibleCells<'_> {
        VisibleCells::new(&self.ids, &self.placements, viewport)
    }

    /// Re-place every card from `start` on, keeping the ones before it.
    fn place_from(&mut self, start: usize) {
        let start = start.min(self.placements.len());
        self.placements.truncate(start);

        // Bottom edge of each column, `None` while the column is empty
        let mut bottoms: Vec<Option<f32>> = vec![None; self.column_count];
        for placement in &self.placements {
            let bottom = &mut bottoms[placement.column];
            *bottom = Some(bottom.map_or(placement.bottom(), |b| b.max(placement.bottom())));
        }

        for index in start..self.ids.len() {
            let id = self.ids[index];
            let (height, measured) = match self.measured.get(&id) {
                Some(&h) => (h, true),
                None => (self.estimated_height, false),
            };

            let column = shortest_column(&bottoms);
            let top = bottoms[column].map_or(0.0, |b| b + self.gutter);

            self.placements.push(Placement {
                column,
                left: column as f32 * (self.column_width + self.gutter),
                top,
                height,
                measured,
            });
            bottoms[column] = Some(top + height);
        }
    }
}

/// Whether two records render the same card. Membership is left out: a
/// join or leave never changes a card's size.
fn same_card(a: &Event, b: &Event) -> bool {
    a.id == b.id
        && a.title == b.title
        && a.description == b.description
        && a.occurs_at == b.occurs_at
        && a.place_id == b.place_id
}

/// Index of the shortest column, leftmost on ties. Empty columns count as 0.
fn shortest_column(bottoms: &[Option<f32>]) -> usize {
    let mut best = 0;
    let mut best_height = f32::INFINITY;

    for (column, bottom) in bottoms.iter().enumerate() {
        let height = match bottom {
            None => return column,
            Some(h) => *h,
        };
        if height < best_height {
            best = column;
            best_height = height;
        }
    }
    best
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
