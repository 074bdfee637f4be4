//! Reporting the run outcome to the CI runner.

use tracing::error;

/// Mark the run as failed with `message` as its diagnostic.
///
/// Emits a GitHub Actions `::error::` workflow command so the message shows
/// up as an annotation on the run.
pub fn fail(message: &str) {
    error!("{}", message);
    println!("{}", error_command(message));
}

fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Escape a workflow command payload.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
