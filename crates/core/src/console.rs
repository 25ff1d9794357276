//! Console output helpers
//!
//! Consistent task colors and status glyphs for terminal output.

use colored::{Color, ColoredString, Colorize};

use crate::task::TaskStatus;

// Label palette for task names. Red, yellow, and green are reserved for
// statuses, so names pick from these instead.
const TASK_PALETTE: [Color; 6] = [
    Color::TrueColor {
        r: 147,
        g: 112,
        b: 219,
    }, // slate blue
    Color::TrueColor {
        r: 64,
        g: 224,
        b: 208,
    }, // turquoise
    Color::TrueColor {
        r: 255,
        g: 140,
        b: 0,
    }, // dark orange
    Color::TrueColor {
        r: 199,
        g: 21,
        b: 133,
    }, // violet red
    Color::TrueColor {
        r: 72,
        g: 209,
        b: 204,
    }, // aqua
    Color::TrueColor {
        r: 138,
        g: 43,
        b: 226,
    }, // blue violet
];

/// A stable color for a task name, so a task keeps its color across every
/// line and every run.
pub fn get_task_color(task_name: &str) -> Color {
    let hash = task_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    TASK_PALETTE[(hash % TASK_PALETTE.len() as u64) as usize]
}

/// Render a status for report lines: glyph plus colored label.
pub fn format_status(status: &TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => "· pending".dimmed(),
        TaskStatus::Running => "▸ running".cyan(),
        TaskStatus::Succeeded => "✓ succeeded".green(),
        TaskStatus::Skipped(reason) => format!("- skipped ({reason})").yellow(),
        TaskStatus::Failed(cause) => format!("✗ failed: {cause}").red(),
    }
}
