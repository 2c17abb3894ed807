//! Human-facing status lines. Progress goes to stdout, errors to stderr.

use std::io::Write;
use std::path::PathBuf;

use crate::color::{
    color_enabled_stderr, color_enabled_stdout, paint, BLUE, BOLD, GREEN, RED, YELLOW,
};

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

pub(crate) fn format_step(enabled: bool, msg: &str) -> String {
    paint(enabled, &format!("{BLUE}{BOLD}"), &format!("▶ {msg}"))
}

pub(crate) fn format_success(enabled: bool, msg: &str) -> String {
    paint(enabled, GREEN, &format!("✓ {msg}"))
}

pub(crate) fn format_warning(enabled: bool, msg: &str) -> String {
    paint(enabled, YELLOW, &format!("⚠ {msg}"))
}

pub(crate) fn format_error(enabled: bool, msg: &str) -> String {
    paint(enabled, RED, &format!("✗ {msg}"))
}

/// Blank line, then a bold `▶` step header.
pub fn print_step(msg: &str) {
    println!("\n{}", format_step(color_enabled_stdout(), msg));
    flush_stdout();
}

pub fn print_success(msg: &str) {
    println!("{}", format_success(color_enabled_stdout(), msg));
    flush_stdout();
}

pub fn print_warning(msg: &str) {
    println!("{}", format_warning(color_enabled_stdout(), msg));
    flush_stdout();
}

pub fn print_error(msg: &str) {
    eprintln!("{}", format_error(color_enabled_stderr(), msg));
}

/// A bold line with no marker, used for headers.
pub fn print_banner_line(msg: &str) {
    println!("{}", paint(color_enabled_stdout(), BOLD, msg));
}

/// List reject files, then quote the given excerpts under a `--- path ---` header each.
pub fn print_rejects(rejects: &[PathBuf], excerpts: &[(PathBuf, String)]) {
    for r in rejects {
        println!("{}", r.display());
    }
    let use_color = color_enabled_stdout();
    for (path, text) in excerpts {
        println!(
            "\n{}",
            paint(use_color, YELLOW, &format!("--- {} ---", path.display()))
        );
        println!("{text}");
    }
    flush_stdout();
}
