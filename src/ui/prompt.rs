use std::io::{BufRead, Write};

use crate::color::{color_enabled_stdout, paint, YELLOW};
use crate::ports::Prompter;

/// Reads a `[y/N]` answer from stdin. EOF or anything but `y`/`yes` is a no.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, question: &str) -> bool {
        print!("{} ", paint(color_enabled_stdout(), YELLOW, question));
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!();
                false
            }
            Ok(_) => is_yes(&line),
        }
    }
}

/// Confirms everything without asking (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Prompter for AutoConfirm {
    fn confirm(&self, question: &str) -> bool {
        tracing::info!(question, "auto-confirmed");
        true
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
