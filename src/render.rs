//! Terminal rendering of event cards and notifications.
//!
//! Every card line is padded to the column width before it is colored, so
//! the number of lines a card produces is its measured height in the grid.

use eventos_core::Event;
use eventos_core::membership::Action;
use owo_colors::OwoColorize;

use crate::view::Notice;

/// Narrowest card that still fits a date line.
pub const MIN_CARD_WIDTH: u16 = 8;

/// Render one card as lines of exactly `width` visible characters.
pub fn card_lines(event: &Event, width: usize) -> Vec<String> {
    let width = width.max(usize::from(MIN_CARD_WIDTH));
    let mut lines = Vec::new();

    for line in wrap(&event.title, width) {
        lines.push(pad(&line, width).bold().to_string());
    }

    let when = event.occurs_at.format("%a %d %b %Y, %H:%M").to_string();
    lines.push(pad(&when, width).cyan().to_string());

    let place = format!("place #{}", event.place_id);
    lines.push(pad(&place, width).dimmed().to_string());

    if !event.description.trim().is_empty() {
        lines.push(" ".repeat(width));
        for line in wrap(&event.description, width) {
            lines.push(pad(&line, width));
        }
    }

    lines.push(" ".repeat(width));
    lines.push(membership_line(event, width));
    lines.push("─".repeat(width).dimmed().to_string());

    lines
}

/// "✓ going · leave #7" or "join #7"
fn membership_line(event: &Event, width: usize) -> String {
    let action = Action::for_membership(event.is_member);
    let hint = format!("{} #{}", action, event.id);

    if event.is_member {
        let text = pad(&format!("✓ going · {hint}"), width);
        text.green().to_string()
    } else {
        pad(&hint, width).yellow().to_string()
    }
}

/// Shown instead of the grid when the roster is empty.
pub fn empty_state() -> String {
    "No events found".dimmed().to_string()
}

pub fn loading_state() -> String {
    "Loading events...".dimmed().to_string()
}

/// Transient notification, printed once.
pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Failure(message) => format!("{} {}", "✗".red(), message.red()),
        Notice::Success(message) => format!("{} {}", "✓".green(), message),
    }
}

/// Greedy word wrap on character counts. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pad or cut `text` to exactly `width` characters.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.chars().take(width).collect()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}
