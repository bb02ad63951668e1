//! Human-readable progress channel of the export command.

use std::io::Write;

/// Receives the text lines an export run reports.
pub trait Output {
    fn emit(&mut self, line: &str);
}

impl Output for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Writes each line to stdout.
#[derive(Debug, Default)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn emit(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout leaves nobody to report to.
        let _ = writeln!(stdout, "{line}");
    }
}
