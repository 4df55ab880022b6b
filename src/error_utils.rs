//! Error reporting helpers.
//!
//! Library errors carry their cause through `source()`; these helpers turn
//! such a chain into one line for the terminal or the log.

use std::error::Error;

use tracing::debug;

/// Render an error and all of its causes as `outer: inner: innermost`.
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}

/// Report an error consistently with user-facing output.
pub fn report_error(error: &dyn Error) {
    debug!("{:?}", error);
    eprintln!("ERROR: {}", error_chain(error));
}

/// Hint for the most common failures, keyed on HTTP status.
pub fn user_hint(status: Option<u16>) -> Option<&'static str> {
    match status? {
        401 => Some("Authentication failed. Check --username and --password (or WAPICTL_PASSWORD)."),
        403 => Some("Access forbidden. The account lacks permission for this operation."),
        404 => Some("Not found. Check the object type, member name or task reference."),
        502..=504 => Some("The grid manager is busy or restarting. Try again in a few minutes."),
        _ => None,
    }
}
