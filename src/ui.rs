// UI layer: everything the user sees on the terminal. Response dumps and
// the final result go to stdout; the spinner draws on stderr and hides
// itself when stderr is not a terminal.

use std::fmt::Debug;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Print a decoded response body followed by its HTTP status code.
pub fn print_response<T: Debug>(status: u16, body: &T) {
    println!("Response: {:?}", body);
    println!("ResponseCode: {}", status);
}

/// Render the pipeline result as JSON indented by two spaces.
pub fn render_result(result: &serde_json::Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn print_final_result(result: &serde_json::Value) -> serde_json::Result<()> {
    let rendered = render_result(result)?;
    println!("Final result: \n{}", rendered);
    Ok(())
}

/// Spinner shown while a phase is waiting on the remote side.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
