//! User-facing message formatting.
//!
//! Errors and warnings from every layer go through here so they read the same on
//! the terminal.

const TAG: &str = "jobgraph";

/// Format an error message for `bail!`/`with_context`.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("{}: {}", TAG, msg.as_ref())
}

/// Report a recoverable problem on stderr and keep going.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("{} warning: {}", TAG, msg.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_is_tagged() {
        assert_eq!(error_message("bad plan"), "jobgraph: bad plan");
        assert_eq!(error_message(format!("stream {}", "s1")), "jobgraph: stream s1");
    }
}
