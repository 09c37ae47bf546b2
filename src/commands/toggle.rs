use std::process::ExitCode;

use anyhow::Result;
use eventos_core::config::Config;
use eventos_core::membership::Action;
use eventos_core::remote::HttpRemote;
use eventos_core::{EventId, UserId};

use crate::commands::events::print_notices;
use crate::utils::tui::create_spinner;
use crate::view::{Notice, RosterView};

pub async fn run(config: &Config, user: UserId, event: EventId, action: Action) -> Result<ExitCode> {
    let remote = HttpRemote::from_config(config)?;
    let mut view = RosterView::new(remote, user, config.column_width, config.gutter);

    let spinner = create_spinner("Loading events");
    view.activate().await;
    spinner.finish_and_clear();

    if print_notices(&mut view) {
        return Ok(ExitCode::FAILURE);
    }

    if view.roster().get(event).is_none() {
        tracing::debug!(%event, "event not in roster, leaving validation to the server");
    }

    let spinner = create_spinner(match action {
        Action::Join => format!("Joining event #{event}"),
        Action::Leave => format!("Leaving event #{event}"),
    });
    let confirmed = view.toggle(event, action).await;
    spinner.finish_and_clear();

    if confirmed {
        if let Some(card) = view.render_card(event) {
            for line in card {
                println!("{line}");
            }
        }

        let message = match action {
            Action::Join => format!("Joined event #{event}"),
            Action::Leave => format!("Left event #{event}"),
        };
        view.notify(Notice::Success(message));
    }

    let failed = print_notices(&mut view);
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
