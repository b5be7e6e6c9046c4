pub mod calendar;
pub mod config;
pub mod db;
pub mod exercise;
pub mod goal;
pub mod history;
pub mod profile;
pub mod session;
pub mod stats;
pub mod status;
pub mod summary;
pub mod types;

use anyhow::{Result, anyhow};
use colored::{Color, ColoredString, Colorize};
use gymtracker::models::{WorkoutTypePreset, same_label};

/// Resolves a 1-based index as printed by the list commands.
pub fn pick<'a, T>(items: &'a [T], idx: usize, what: &str) -> Result<&'a T> {
    idx.checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or_else(|| anyhow!("no {what} #{idx} ({} available)", items.len()))
}

/// Index (1-based) or name, as accepted by the delete commands.
pub fn position_of<T>(items: &[T], query: &str, name: impl Fn(&T) -> &str) -> Option<usize> {
    match query.trim().parse::<usize>() {
        Ok(n) => n.checked_sub(1).filter(|i| *i < items.len()),
        Err(_) => items.iter().position(|it| same_label(name(it), query.trim())),
    }
}

/// Strips ANSI escapes to measure what the terminal will show.
pub fn plain_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut count = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1B {
            while i < bytes.len() && bytes[i] != b'm' {
                i += 1;
            }
            i += 1;
        } else if bytes[i] & 0xC0 != 0x80 {
            count += 1;
            i += 1;
        } else {
            i += 1;
        }
    }

    count
}

/// Prints `left | right` rows with the bars aligned.
pub fn print_aligned(rows: Vec<(String, String)>) {
    let pad = rows.iter().map(|(l, _)| plain_len(l)).max().unwrap_or(0);
    for (l, r) in rows {
        let total_pad = pad + l.len() - plain_len(&l);
        println!("{:<total_pad$} {} {}", l, "|".blue(), r, total_pad = total_pad);
    }
}

fn preset_color(class: &str) -> Color {
    if class.contains("orange") {
        Color::TrueColor { r: 249, g: 115, b: 22 }
    } else if class.contains("blue") {
        Color::Blue
    } else if class.contains("purple") {
        Color::Magenta
    } else if class.contains("emerald") || class.contains("green") {
        Color::Green
    } else {
        Color::White
    }
}

/// A workout type label in its preset color; unknown labels stay plain.
pub fn paint_type(label: &str, presets: &[WorkoutTypePreset]) -> ColoredString {
    match presets.iter().find(|p| same_label(&p.label, label)) {
        Some(p) => label.color(preset_color(&p.color)).bold(),
        None => label.normal(),
    }
}

pub fn ok(msg: impl std::fmt::Display) {
    println!("{} {}", "ok:".green().bold(), msg);
}

pub fn warn(msg: impl std::fmt::Display) {
    println!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn info(msg: impl std::fmt::Display) {
    println!("{} {}", "info:".blue().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_one_based() {
        let items = ["a", "b"];
        assert_eq!(*pick(&items, 1, "item").unwrap(), "a");
        assert!(pick(&items, 0, "item").is_err());
        assert!(pick(&items, 3, "item").is_err());
    }

    #[test]
    fn position_by_index_or_name() {
        let items = vec!["Squat".to_string(), "Dips".to_string()];
        assert_eq!(position_of(&items, "2", |s| s.as_str()), Some(1));
        assert_eq!(position_of(&items, "dips", |s| s.as_str()), Some(1));
        assert_eq!(position_of(&items, "9", |s| s.as_str()), None);
        assert_eq!(position_of(&items, "Rowing", |s| s.as_str()), None);
    }

    #[test]
    fn plain_len_ignores_escapes() {
        colored::control::set_override(true);
        let s = format!("{} é", "abc".red());
        assert_eq!(plain_len(&s), 5);
    }
}
