use std::process::ExitCode;

use anyhow::Result;
use eventos_core::UserId;
use eventos_core::config::Config;
use eventos_core::remote::{HttpRemote, RosterRemote};
use owo_colors::OwoColorize;

use crate::render;
use crate::utils::tui::create_spinner;
use crate::view::{Notice, RosterView, Screen, Window};

pub async fn run(config: &Config, user: UserId, window: Window, width: u16) -> Result<ExitCode> {
    let remote = HttpRemote::from_config(config)?;
    let mut view = RosterView::new(remote, user, config.column_width, config.gutter);
    view.set_width(width);

    let spinner = create_spinner("Loading events");
    view.activate().await;
    spinner.finish_and_clear();

    let failed = print_notices(&mut view);

    match view.render(window) {
        Screen::Loading => println!("{}", render::loading_state()),
        Screen::Empty => println!("{}", render::empty_state()),
        Screen::Grid(frame) => {
            for line in &frame.lines {
                println!("{line}");
            }

            if window.rows.is_some() {
                let last = (frame.first_row + frame.lines.len()).min(frame.total_rows);
                let footer = format!(
                    "rows {}-{} of {} · {} {} shown",
                    frame.first_row,
                    last,
                    frame.total_rows,
                    frame.cards_shown,
                    if frame.cards_shown == 1 { "event" } else { "events" }
                );
                println!("{}", footer.dimmed());
            }
        }
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Print pending notices to stderr. Returns whether any was a failure.
pub fn print_notices<R: RosterRemote>(view: &mut RosterView<R>) -> bool {
    let mut failed = false;
    for notice in view.drain_notices() {
        failed |= matches!(notice, Notice::Failure(_));
        eprintln!("{}", render::notice(&notice));
    }
    failed
}
