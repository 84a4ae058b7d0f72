//! Terminal output for the CLI.

use console::{Style, Term};

/// Writes human-facing lines to stderr.
pub(crate) struct Output {
    term: Term,
    error: Style,
    link: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            error: Style::new().red(),
            link: Style::new().cyan().bold(),
        }
    }

    /// Print a plain line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print an error line in red.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.error.apply_to(msg).to_string());
    }

    /// Print `label: url` with the URL highlighted.
    pub(crate) fn url(&self, label: &str, url: &str) {
        self.info(&format!("{label}: {}", self.link.apply_to(url)));
    }
}
