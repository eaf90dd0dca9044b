use chrono::{DateTime, Utc};

use lexicard_lib::activity::HeatmapDay;
use lexicard_lib::review::format_interval;
use lexicard_lib::storage::WordRecord;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// When a word comes up next, relative to `now`
pub fn due_label(word: &WordRecord, now: DateTime<Utc>) -> String {
    match word.next_review {
        Some(next) if next > now => {
            let days = (next - now).num_hours().max(0) / 24;
            format!("in {}", format_interval(days.max(1)))
        }
        _ => "due".to_string(),
    }
}

/// One line per word: id, text, translation, pronunciation, status
pub fn word_line(word: &WordRecord, now: DateTime<Utc>, use_color: bool) -> String {
    let mut line = format!(
        "{}  {}",
        paint(&word.id, Color::GRAY, use_color),
        paint(&word.word, Color::BOLD, use_color)
    );
    if let Some(pronunciation) = &word.pronunciation {
        line.push_str(&format!(" [{}]", pronunciation));
    }
    if !word.translation.is_empty() {
        line.push_str(&format!(" - {}", word.translation));
    }

    let due = due_label(word, now);
    let due_color = if due == "due" { Color::YELLOW } else { Color::DIM };
    line.push_str(&format!("  {}", paint(&due, due_color, use_color)));
    if word.is_archived() {
        line.push_str(&format!(" {}", paint("[archived]", Color::DIM, use_color)));
    }
    line
}

/// Heatmap as a single row of shade characters, oldest day first
pub fn heatmap_row(days: &[HeatmapDay], use_color: bool) -> String {
    days.iter()
        .map(|day| {
            let (glyph, color) = match day.level {
                0 => ("·", Color::GRAY),
                1 => ("░", Color::GREEN),
                2 => ("▒", Color::GREEN),
                3 => ("▓", Color::GREEN),
                _ => ("█", Color::GREEN),
            };
            paint(glyph, color, use_color)
        })
        .collect()
}

/// Text progress bar of `width` cells
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
