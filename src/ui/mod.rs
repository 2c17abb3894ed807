pub mod console;
pub mod progress;
pub mod prompt;

pub use console::{
    print_banner_line, print_error, print_rejects, print_step, print_success, print_warning,
};
pub use progress::ConsoleProgress;
pub use prompt::{AutoConfirm, StdinPrompter};
