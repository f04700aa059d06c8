//! Test utilities and mocks for cmake-bridge unit tests.
//!
//! [`MockExecutor`] stands in for the shell so build driver tests can script
//! CMake's exit codes and output, and assert on the exact commands issued.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut exec = MockExecutor::new();
//! exec.forbid_contains(" -S ")
//!     .expect_contains(" --build ", MockProcessOutput::success("[100%] Built"));
//!
//! CMakeBuilder::new(&target, &profile, &exec).build()?;
//! assert_eq!(exec.calls().len(), 1);
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{ProcessOutput, ProcessRunner};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            exit_code: self.status,
            output: format!("{}{}", self.stdout, self.stderr),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched; `None` makes a match a test failure.
    pub output: Option<MockProcessOutput>,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output: Some(output),
            times: None,
            used: 0,
        }
    }

    /// An expectation that fails whenever it matches.
    pub fn forbidden(pattern: CommandPattern) -> Self {
        CommandExpectation {
            pattern,
            output: None,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<(PathBuf, String)>,
}

/// Mock process executor for testing command execution.
///
/// Records every command and its working directory, answers from the
/// registered expectations, and errors on commands nothing expects.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    fn push(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.state
            .get_mut()
            .unwrap_or_else(|p| p.into_inner())
            .expectations
            .push(expectation);
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.push(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.push(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Fail any command containing `substring`.
    pub fn forbid_contains(&mut self, substring: &str) -> &mut Self {
        self.push(CommandExpectation::forbidden(CommandPattern::Contains(
            substring.to_string(),
        )))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.push(expectation)
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(_, cmd)| cmd.clone()).collect()
    }

    /// Working directories of all calls.
    pub fn dirs(&self) -> Vec<PathBuf> {
        self.lock().calls.iter().map(|(dir, _)| dir.clone()).collect()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.lock().expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ProcessRunner for MockExecutor {
    fn run(&self, cwd: &Path, command_line: &str) -> Result<ProcessOutput> {
        let mut state = self.lock();
        state
            .calls
            .push((cwd.to_path_buf(), command_line.to_string()));

        for exp in &mut state.expectations {
            if exp.pattern.matches(command_line) && exp.available() {
                exp.used += 1;
                return match exp.output {
                    Some(ref output) => Ok(output.to_output()),
                    None => bail!("forbidden command: {}", command_line),
                };
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.to_output());
        }

        bail!("unexpected command: {}", command_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_in_order() {
        let mut exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::StartsWith("cmake".into()),
                MockProcessOutput::failure(1, "first"),
            )
            .times(1),
        )
        .expect_prefix("cmake", MockProcessOutput::success("second"));

        let first = exec.run(Path::new("/"), "cmake --version").unwrap();
        let second = exec.run(Path::new("/"), "cmake --version").unwrap();

        assert_eq!(first.exit_code, 1);
        assert_eq!(second.output, "second");
        exec.verify().unwrap();
    }

    #[test]
    fn test_mock_executor_rejects_unexpected_and_forbidden() {
        let mut exec = MockExecutor::new();
        exec.forbid_contains("-S");

        assert!(exec.run(Path::new("/"), "cmake -S src").is_err());
        assert!(exec.run(Path::new("/"), "make").is_err());
        assert_eq!(exec.calls(), ["cmake -S src", "make"]);
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = CommandPattern::Regex(r"--config (Debug|Release)$".into());
        assert!(pattern.matches("cmake --build b --config Debug"));
        assert!(!pattern.matches("cmake --build b"));
    }
}
