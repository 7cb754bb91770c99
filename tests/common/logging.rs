//! Assertions over the tracing output a CLI run leaves on stderr.

/// Log lines captured from stderr.
///
/// ```ignore
/// let result = cli.run(&["-v", "list"]);
/// LogVerifier::from_stderr(&result.stderr)
///     .assert_warn("duplicate profile")
///     .assert_no_errors();
/// ```
pub struct LogVerifier {
    lines: Vec<String>,
}

impl LogVerifier {
    #[must_use]
    pub fn from_stderr(stderr: &str) -> Self {
        Self {
            lines: stderr.lines().map(String::from).collect(),
        }
    }

    fn find(&self, level: &str, message: &str) -> bool {
        let message = message.to_lowercase();
        self.lines
            .iter()
            .any(|line| line.contains(level) && line.to_lowercase().contains(&message))
    }

    /// Panics unless a line at `level` mentions `message` (case-insensitive).
    #[must_use]
    pub fn assert_level(&self, level: &str, message: &str) -> &Self {
        assert!(
            self.find(level, message),
            "No {level} log containing \"{message}\" in:\n{}",
            self.lines.join("\n")
        );
        self
    }

    #[must_use]
    pub fn assert_debug(&self, message: &str) -> &Self {
        self.assert_level("DEBUG", message)
    }

    #[must_use]
    pub fn assert_info(&self, message: &str) -> &Self {
        self.assert_level("INFO", message)
    }

    #[must_use]
    pub fn assert_warn(&self, message: &str) -> &Self {
        self.assert_level("WARN", message)
    }

    #[must_use]
    pub fn assert_no_errors(&self) -> &Self {
        let errors: Vec<_> = self.lines.iter().filter(|l| l.contains("ERROR")).collect();
        assert!(errors.is_empty(), "Unexpected errors logged:\n{errors:#?}");
        self
    }
}
