//! The roster page: state, layout and what the terminal should show.
//!
//! A `RosterView` owns the roster for its lifetime. Dropping it drops the
//! roster, and any membership call still in flight then resolves into
//! nothing.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use eventos_core::layout::{MasonryLayout, Viewport};
use eventos_core::membership::{Action, MembershipController};
use eventos_core::remote::RosterRemote;
use eventos_core::roster::RosterStore;
use eventos_core::{EventId, UserId};

use crate::render;

/// Rows assumed for a card before it has been rendered once.
const ESTIMATED_CARD_ROWS: f32 = 8.0;

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// What the page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Empty,
    Grid(Frame),
}

/// A window of rendered grid rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<String>,
    pub first_row: usize,
    pub total_rows: usize,
    pub cards_shown: usize,
}

/// Rows of the grid to draw. `rows: None` draws everything from `scroll`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub scroll: u16,
    pub rows: Option<u16>,
}

pub struct RosterView<R> {
    user: UserId,
    roster: Rc<RefCell<RosterStore>>,
    controller: MembershipController<R>,
    layout: MasonryLayout,
    column_width: usize,
    gutter: usize,
    loading: bool,
    notices: Vec<Notice>,
}

impl<R: RosterRemote> RosterView<R> {
    pub fn new(remote: R, user: UserId, column_width: u16, gutter: u16) -> Self {
        let column_width = column_width.max(render::MIN_CARD_WIDTH);
        let roster = Rc::new(RefCell::new(RosterStore::new()));
        let controller = MembershipController::new(remote, &roster);
        let layout = MasonryLayout::new(f32::from(column_width), f32::from(gutter))
            .with_estimated_height(ESTIMATED_CARD_ROWS);

        RosterView {
            user,
            roster,
            controller,
            layout,
            column_width: usize::from(column_width),
            gutter: usize::from(gutter),
            loading: true,
            notices: Vec::new(),
        }
    }

    /// Terminal width available to the grid.
    pub fn set_width(&mut self, width: u16) {
        self.layout.set_container_width(f32::from(width));
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn roster(&self) -> Ref<'_, RosterStore> {
        self.roster.borrow()
    }

    /// Load the roster. Failures become a notice and leave an empty page.
    pub async fn activate(&mut self) {
        self.loading = true;
        if let Err(failure) = self.controller.refresh(self.user).await {
            self.notices.push(Notice::Failure(failure.message));
        }
        self.loading = false;
    }

    /// Join or leave an event. Returns whether the server confirmed it.
    pub async fn toggle(&mut self, event: EventId, action: Action) -> bool {
        match self.controller.toggle(event, self.user, action).await {
            Ok(()) => true,
            Err(failure) => {
                self.notices.push(Notice::Failure(failure.message));
                false
            }
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Take the pending notices; each is handed out exactly once.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn render(&mut self, window: Window) -> Screen {
        if self.is_loading() {
            return Screen::Loading;
        }
        if self.roster.borrow().is_empty() {
            return Screen::Empty;
        }
        Screen::Grid(self.render_grid(window))
    }

    /// Render the card of a single event, if it is in the roster.
    pub fn render_card(&self, event: EventId) -> Option<Vec<String>> {
        let roster = self.roster.borrow();
        roster.get(event).map(|e| render::card_lines(e, self.column_width))
    }

    fn render_grid(&mut self, window: Window) -> Frame {
        let roster = self.roster.borrow();
        self.layout.sync(&roster);

        let scroll = f32::from(window.scroll);
        let measure_window = match window.rows {
            Some(rows) => Viewport::new(scroll, f32::from(rows)).with_overscan(ESTIMATED_CARD_ROWS),
            None => Viewport::new(scroll, f32::INFINITY),
        };

        // Render every card that may be on screen, feed its real height back,
        // and repeat until no estimated card is left in the window.
        let mut cards: HashMap<EventId, Vec<String>> = HashMap::new();
        loop {
            let pending: Vec<EventId> = self
                .layout
                .visible(measure_window)
                .filter(|cell| !cell.placement.measured)
                .map(|cell| cell.id)
                .collect();
            if pending.is_empty() {
                break;
            }

            for id in pending {
                let Some(event) = roster.get(id) else {
                    self.layout.measure(id, 0.0);
                    continue;
                };
                let lines = render::card_lines(event, self.column_width);
                self.layout.measure(id, lines.len() as f32);
                cards.insert(id, lines);
            }
        }

        let total_rows = self.layout.total_height() as usize;
        let first_row = usize::from(window.scroll);
        let rows = match window.rows {
            Some(rows) => usize::from(rows),
            None => total_rows.saturating_sub(first_row),
        };

        let blank = " ".repeat(self.column_width);
        let mut grid = vec![vec![blank; self.layout.column_count()]; rows];
        let mut cards_shown = 0;

        for cell in self.layout.visible(Viewport::new(scroll, rows as f32)) {
            let lines = match cards.get(&cell.id) {
                Some(lines) => lines.clone(),
                None => match roster.get(cell.id) {
                    Some(event) => render::card_lines(event, self.column_width),
                    None => continue,
                },
            };
            cards_shown += 1;

            let top = cell.placement.top as usize;
            for (offset, line) in lines.into_iter().enumerate() {
                let row = top + offset;
                if row >= first_row && row < first_row + rows {
                    grid[row - first_row][cell.placement.column] = line;
                }
            }
        }

        let separator = " ".repeat(self.gutter);
        Frame {
            lines: grid.into_iter().map(|row| row.join(&separator)).collect(),
            first_row,
            total_rows,
            cards_shown,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use eventos_core::remote::Failure;
    use eventos_core::{Event, PlaceId};
    use std::cell::Cell;

    pub(crate) fn event(id: i64, is_member: bool) -> Event {
        Event {
            id: EventId(id),
            title: format!("Evento {id}"),
            description: "Encontro no parque".into(),
            occurs_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            place_id: PlaceId(2),
            is_member,
        }
    }

    #[derive(Default)]
    struct FakeRemote {
        roster: Vec<Event>,
        fetch_failure: Option<Failure>,
        toggle_failure: Option<Failure>,
        toggles: Cell<usize>,
        /// Served instead of `roster` from the second fetch on
        refreshed: Option<Vec<Event>>,
        fetches: Cell<usize>,
    }

    impl RosterRemote for FakeRemote {
        async fn fetch_roster(&self, _user: UserId) -> Result<Vec<Event>, Failure> {
            let fetches = self.fetches.get();
            self.fetches.set(fetches + 1);
            match (&self.fetch_failure, &self.refreshed) {
                (Some(failure), _) => Err(failure.clone()),
                (None, Some(refreshed)) if fetches > 0 => Ok(refreshed.clone()),
                (None, _) => Ok(self.roster.clone()),
            }
        }

        async fn join(&self, _event: EventId, _user: UserId) -> Result<(), Failure> {
            self.toggles.set(self.toggles.get() + 1);
            self.toggle_failure.clone().map_or(Ok(()), Err)
        }

        async fn leave(&self, _event: EventId, _user: UserId) -> Result<(), Failure> {
            self.toggles.set(self.toggles.get() + 1);
            self.toggle_failure.clone().map_or(Ok(()), Err)
        }
    }

    fn view(remote: FakeRemote) -> RosterView<FakeRemote> {
        let mut view = RosterView::new(remote, UserId(1), 20, 2);
        view.set_width(64);
        view
    }

    fn flags(view: &RosterView<FakeRemote>) -> Vec<(i64, bool)> {
        view.roster().all().iter().map(|e| (e.id.0, e.is_member)).collect()
    }

    #[test]
    fn test_loading_before_activation() {
        let mut view = view(FakeRemote::default());
        assert!(view.is_loading());
        assert_eq!(view.render(Window::default()), Screen::Loading);
    }

    #[tokio::test]
    async fn test_empty_roster_renders_empty_state() {
        let mut view = view(FakeRemote::default());
        view.activate().await;

        assert!(!view.is_loading());
        assert_eq!(view.render(Window::default()), Screen::Empty);
        assert!(view.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_notified_and_page_is_empty() {
        let mut view = view(FakeRemote {
            fetch_failure: Some(Failure::transport("Estamos com problemas")),
            ..Default::default()
        });
        view.activate().await;

        assert_eq!(view.render(Window::default()), Screen::Empty);
        assert_eq!(
            view.drain_notices(),
            vec![Notice::Failure("Estamos com problemas".into())]
        );
    }

    #[tokio::test]
    async fn test_join_end_to_end() {
        let mut view = view(FakeRemote {
            roster: vec![event(1, false), event(2, false)],
            ..Default::default()
        });
        view.activate().await;

        assert!(view.toggle(EventId(1), Action::Join).await);

        assert_eq!(flags(&view), vec![(1, true), (2, false)]);
        assert!(view.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_join_surfaces_message_once() {
        let mut view = view(FakeRemote {
            roster: vec![event(1, false), event(2, false)],
            toggle_failure: Some(Failure::application("Estamos com problemas")),
            ..Default::default()
        });
        view.activate().await;

        assert!(!view.toggle(EventId(1), Action::Join).await);

        assert_eq!(flags(&view), vec![(1, false), (2, false)]);
        assert_eq!(
            view.drain_notices(),
            vec![Notice::Failure("Estamos com problemas".into())]
        );
        assert!(view.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_grid_places_cards_side_by_side() {
        let mut view = view(FakeRemote {
            roster: vec![event(1, false), event(2, true), event(3, false), event(4, false)],
            ..Default::default()
        });
        view.activate().await;

        let Screen::Grid(frame) = view.render(Window::default()) else {
            panic!("expected the grid");
        };

        // 64 cells fit three 20-wide columns with a 2-wide gutter
        assert_eq!(frame.cards_shown, 4);
        assert!(frame.lines[0].contains("Evento 1"));
        assert!(frame.lines[0].contains("Evento 2"));
        assert!(frame.lines[0].contains("Evento 3"));
        assert!(frame.lines.iter().any(|line| line.contains("Evento 4")));
        assert_eq!(frame.lines.len(), frame.total_rows);
    }

    #[tokio::test]
    async fn test_window_only_renders_visible_cards() {
        let roster = (1..=30).map(|id| event(id, false)).collect();
        let mut view = view(FakeRemote {
            roster,
            ..Default::default()
        });
        view.activate().await;

        let full = match view.render(Window::default()) {
            Screen::Grid(frame) => frame,
            other => panic!("unexpected screen {other:?}"),
        };
        let window = match view.render(Window { scroll: 0, rows: Some(5) }) {
            Screen::Grid(frame) => frame,
            other => panic!("unexpected screen {other:?}"),
        };

        assert_eq!(full.cards_shown, 30);
        assert_eq!(window.lines.len(), 5);
        assert_eq!(window.cards_shown, 3);
        assert_eq!(window.total_rows, full.total_rows);
        assert_eq!(window.lines[..], full.lines[..5]);
    }

    #[tokio::test]
    async fn test_render_card_after_toggle() {
        let mut view = view(FakeRemote {
            roster: vec![event(5, false)],
            ..Default::default()
        });
        view.activate().await;
        view.toggle(EventId(5), Action::Join).await;

        let card = view.render_card(EventId(5)).unwrap().join("\n");
        assert!(card.contains("leave #5"));
        assert!(view.render_card(EventId(6)).is_none());
    }

    #[tokio::test]
    async fn test_refreshed_card_is_measured_again() {
        let mut short = event(1, false);
        short.description = String::new();
        let mut long = event(1, false);
        long.description = "Encontro no parque com piquenique, música ao vivo e oficinas para crianças".into();

        let mut view = RosterView::new(
            FakeRemote {
                roster: vec![short, event(2, false)],
                refreshed: Some(vec![long, event(2, false)]),
                ..Default::default()
            },
            UserId(1),
            20,
            2,
        );
        view.set_width(20);
        view.activate().await;

        let Screen::Grid(before) = view.render(Window::default()) else {
            panic!("expected the grid");
        };

        view.activate().await;
        let Screen::Grid(after) = view.render(Window::default()) else {
            panic!("expected the grid");
        };

        let card = view.render_card(EventId(1)).unwrap();
        let placement = view.layout.placement(EventId(1)).unwrap();
        assert!(placement.measured);
        assert_eq!(placement.height, card.len() as f32);
        assert_eq!(&after.lines[..card.len()], &card[..]);
        assert!(after.total_rows > before.total_rows);
    }

    #[tokio::test]
    async fn test_narrow_columns_are_widened_to_fit_a_card() {
        let mut view = RosterView::new(
            FakeRemote {
                roster: vec![event(1, false), event(2, false), event(3, false)],
                ..Default::default()
            },
            UserId(1),
            4,
            2,
        );
        view.set_width(20);
        view.activate().await;
        view.render(Window::default());

        assert_eq!(view.layout.column_count(), 2);
        assert!(view.layout.total_width() <= 20.0);
        assert_eq!(view.render_card(EventId(1)).unwrap()[0].len(), render::card_lines(&event(1, false), 8)[0].len());
    }
}
