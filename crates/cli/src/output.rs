//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Status lines go to stdout,
//! problems to stderr.

use owo_colors::OwoColorize;
use std::time::Duration;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a URL the user can open
    pub fn link(label: &str, url: &str) {
        eprintln!("  {} {}", format!("{label}:").dimmed(), url.underline());
    }
}

/// Format a duration for display
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// "1m 20s elapsed, about 2m 40s left"; `None` left means the estimate passed
pub fn format_eta(elapsed: Duration, left: Option<Duration>) -> String {
    let elapsed_text = format_duration(whole_seconds(elapsed));
    match left {
        Some(left) if !left.is_zero() => format!(
            "{} elapsed, about {} left",
            elapsed_text,
            format_duration(whole_seconds(left))
        ),
        _ => format!("{} elapsed, taking longer than usual", elapsed_text),
    }
}

fn whole_seconds(duration: Duration) -> Duration {
    Duration::from_secs(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        let d = Duration::from_secs_f32(5.5);
        assert_eq!(format_duration(d), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(500), "500 B");
    }

    #[test]
    fn test_format_size_kb() {
        assert_eq!(format_size(2048), "2.00 KB");
    }

    #[test]
    fn test_format_size_mb() {
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(
            format_eta(Duration::from_secs(80), Some(Duration::from_secs(160))),
            "1m 20s elapsed, about 2m 40s left"
        );
        assert_eq!(
            format_eta(Duration::from_secs(300), None),
            "5m 0s elapsed, taking longer than usual"
        );
        assert_eq!(
            format_eta(Duration::from_secs(240), Some(Duration::ZERO)),
            "4m 0s elapsed, taking longer than usual"
        );
    }
}
