//! Subprocess execution utilities.
//!
//! External tools are run through the host shell so that a command line is
//! interpreted exactly as an operator would type it. Standard output and
//! standard error are drained on their own threads while the child runs,
//! into one buffer in arrival order.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::util::diagnostic::ExternalBuildError;

/// How often a child with a timeout or cancellation flag is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit code and merged stdout/stderr of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; -1 when the process was terminated by a signal.
    pub exit_code: i32,
    /// Everything written to stdout and stderr, in arrival order.
    pub output: String,
}

impl ProcessOutput {
    /// Check if the process exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a shell command line in a working directory and blocks until it exits.
///
/// A nonzero exit is not an error at this level; callers decide what a
/// failing command means and attach the captured output to their error.
pub trait ProcessRunner {
    fn run(&self, cwd: &Path, command_line: &str) -> Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, cwd: &Path, command_line: &str) -> Result<ProcessOutput> {
        (**self).run(cwd, command_line)
    }
}

/// [`ProcessRunner`] backed by the host shell (`sh -c` or `cmd /C`).
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl ShellRunner {
    pub fn new() -> Self {
        ShellRunner::default()
    }

    /// Kill the command if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kill the command as soon as `flag` becomes true.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, cwd: &Path, command_line: &str) -> Result<ProcessOutput> {
        tracing::info!("Running `{}`", command_line);

        let mut pb = ProcessBuilder::shell(command_line).cwd(cwd);
        if let Some(timeout) = self.timeout {
            pb = pb.timeout(timeout);
        }
        if let Some(ref flag) = self.cancel {
            pb = pb.cancel_flag(Arc::clone(flag));
        }

        let output = pb.exec()?;
        if !output.success() {
            tracing::debug!("`{}` exited with code {}", command_line, output.exit_code);
        }
        Ok(output)
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    /// Arguments are passed verbatim instead of being quoted by the runtime.
    #[cfg_attr(not(windows), allow(dead_code))]
    raw_args: bool,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
    Cancelled,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            raw_args: false,
            cwd: None,
            timeout: None,
            cancel: None,
        }
    }

    /// Create a process builder that hands `command_line` to the host shell.
    ///
    /// On Windows the line is wrapped in one extra pair of quotes for
    /// `cmd /S /C`, which strips exactly that pair and keeps inner quoting.
    pub fn shell(command_line: &str) -> Self {
        if cfg!(windows) {
            let mut pb = ProcessBuilder::new("cmd")
                .args(["/D", "/S", "/C"])
                .arg(format!("\"{}\"", command_line));
            pb.raw_args = true;
            pb
        } else {
            ProcessBuilder::new("sh").arg("-c").arg(command_line)
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Kill the process tree once `timeout` has elapsed.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Kill the process tree once `flag` is set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        self.apply_args(&mut cmd);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        // Own process group, so a timeout or cancel can take down everything
        // the shell spawned. Without either, the child stays in our group and
        // receives terminal signals with us.
        #[cfg(unix)]
        if self.is_killable() {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd
    }

    #[cfg(windows)]
    fn apply_args(&self, cmd: &mut Command) {
        use std::os::windows::process::CommandExt;
        if self.raw_args {
            for arg in &self.args {
                cmd.raw_arg(arg);
            }
        } else {
            cmd.args(&self.args);
        }
    }

    #[cfg(not(windows))]
    fn apply_args(&self, cmd: &mut Command) {
        cmd.args(&self.args);
    }

    /// Execute the command, capturing merged output, and wait for completion.
    pub fn exec(&self) -> Result<ProcessOutput> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let captured = Arc::new(Mutex::new(String::new()));
        let drains: Vec<JoinHandle<()>> = [
            child.stdout.take().map(|s| drain(s, Arc::clone(&captured))),
            child.stderr.take().map(|s| drain(s, Arc::clone(&captured))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let outcome = self.wait(&mut child);

        for handle in drains {
            if handle.join().is_err() {
                tracing::warn!("output reader for `{}` panicked", self.program.display());
            }
        }

        let output = std::mem::take(&mut *captured.lock().unwrap_or_else(|p| p.into_inner()));

        match outcome? {
            WaitOutcome::Exited(status) => Ok(ProcessOutput {
                exit_code: status.code().unwrap_or(-1),
                output,
            }),
            WaitOutcome::TimedOut(timeout) => Err(ExternalBuildError::Timeout {
                command: self.display_command(),
                timeout,
                output,
            }
            .into()),
            WaitOutcome::Cancelled => Err(ExternalBuildError::Cancelled {
                command: self.display_command(),
                output,
            }
            .into()),
        }
    }

    fn is_killable(&self) -> bool {
        self.timeout.is_some() || self.cancel.is_some()
    }

    fn wait(&self, child: &mut Child) -> Result<WaitOutcome> {
        if !self.is_killable() {
            let status = child
                .wait()
                .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;
            return Ok(WaitOutcome::Exited(status));
        }

        let started = Instant::now();
        loop {
            if let Some(status) = child
                .try_wait()
                .with_context(|| format!("failed to wait for `{}`", self.program.display()))?
            {
                return Ok(WaitOutcome::Exited(status));
            }

            if let Some(ref flag) = self.cancel {
                if flag.load(Ordering::SeqCst) {
                    kill_tree(child);
                    return Ok(WaitOutcome::Cancelled);
                }
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    kill_tree(child);
                    return Ok(WaitOutcome::TimedOut(timeout));
                }
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Copy a child stream into the shared buffer line by line until EOF.
fn drain<R: Read + Send + 'static>(stream: R, sink: Arc<Mutex<String>>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    tracing::debug!("{}", text.trim_end());
                    sink.lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push_str(&text);
                }
                Err(e) => {
                    tracing::warn!("failed to read process output: {}", e);
                    break;
                }
            }
        }
    })
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let group = format!("-{}", child.id());
    let killed = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !killed {
        let _ = child.kill();
    }
    let _ = child.wait();
}

#[cfg(windows)]
fn kill_tree(child: &mut Child) {
    let killed = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &child.id().to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !killed {
        let _ = child.kill();
    }
    let _ = child.wait();
}

/// Quote one argument for the host shell.
pub fn quote_arg(arg: &str) -> String {
    if cfg!(windows) {
        quote_windows(arg)
    } else {
        quote_posix(arg)
    }
}

/// Double-quote for `sh`, escaping the characters still special inside quotes.
pub fn quote_posix(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Double-quote following the MSVC runtime argv rules.
pub fn quote_windows(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    // Backslashes before the closing quote must not escape it.
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_posix_paths_with_spaces_and_quotes() {
        assert_eq!(quote_posix("/tmp/my project"), "\"/tmp/my project\"");
        assert_eq!(quote_posix("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_posix("$HOME/`x`"), "\"\\$HOME/\\`x\\`\"");
        assert_eq!(quote_posix("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_quote_windows_paths_with_spaces_and_quotes() {
        assert_eq!(
            quote_windows("C:\\Program Files\\proj"),
            "\"C:\\Program Files\\proj\""
        );
        assert_eq!(quote_windows("C:\\dir\\"), "\"C:\\dir\\\\\"");
        assert_eq!(quote_windows("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_windows("a\\\"b"), "\"a\\\\\\\"b\"");
    }

    #[test]
    fn test_shell_wraps_line_for_cmd() {
        let pb = ProcessBuilder::shell("\"cmake\" --build \"b\"");

        if cfg!(windows) {
            assert_eq!(pb.program, PathBuf::from("cmd"));
            assert_eq!(pb.args, ["/D", "/S", "/C", "\"\"cmake\" --build \"b\"\""]);
            assert!(pb.raw_args);
        } else {
            assert_eq!(pb.program, PathBuf::from("sh"));
            assert_eq!(pb.args, ["-c", "\"cmake\" --build \"b\""]);
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_shell_runner_quoted_program_and_args() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("tool dir");
        std::fs::create_dir_all(&dir).unwrap();
        let script = dir.join("echo args.cmd");
        std::fs::write(&script, "@echo [%~1] [%~2]\r\n").unwrap();

        let line = format!(
            "{} {} {}",
            quote_arg(&script.to_string_lossy()),
            quote_arg("C:\\g\\my build"),
            quote_arg("-DFLAGS=-O2 -g")
        );
        let out = ShellRunner::new().run(tmp.path(), &line).unwrap();

        assert!(out.success(), "{}", out.output);
        assert!(out.output.contains("[C:\\g\\my build] [-DFLAGS=-O2 -g]"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_only_killable_runs_get_their_own_process_group() {
        let tmp = tempfile::TempDir::new().unwrap();
        let pgid = |pid: &str| format!("read -r _ _ _ _ g _ < /proc/{}/stat; echo $g", pid);

        let plain = ShellRunner::new()
            .run(tmp.path(), &format!("{}; {}", pgid("$$"), pgid("$PPID")))
            .unwrap();
        let mut lines = plain.output.lines();
        assert_eq!(lines.next(), lines.next());

        let grouped = ShellRunner::new()
            .with_timeout(Some(Duration::from_secs(30)))
            .run(tmp.path(), &format!("{}; echo $$", pgid("$$")))
            .unwrap();
        let mut lines = grouped.output.lines();
        assert_eq!(lines.next(), lines.next());
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cmake").args(["--build", "build", "--config", "Debug"]);

        assert_eq!(pb.display_command(), "cmake --build build --config Debug");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_captures_both_streams() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = ShellRunner::new()
            .run(tmp.path(), "echo out; echo err 1>&2; exit 3")
            .unwrap();

        assert_eq!(out.exit_code, 3);
        assert!(!out.success());
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_uses_working_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), "here").unwrap();

        let out = ShellRunner::new().run(tmp.path(), "cat marker.txt").unwrap();

        assert!(out.success());
        assert_eq!(out.output.trim(), "here");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_large_output_is_not_truncated() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cmd = "head -c 70000 /dev/zero | tr '\\0' a; \
                   head -c 70000 /dev/zero | tr '\\0' b 1>&2";

        let out = ShellRunner::new().run(tmp.path(), cmd).unwrap();

        assert_eq!(out.exit_code, 0);
        assert_eq!(out.output.chars().filter(|&c| c == 'a').count(), 70000);
        assert_eq!(out.output.chars().filter(|&c| c == 'b').count(), 70000);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_timeout_kills_process() {
        let tmp = tempfile::TempDir::new().unwrap();
        let started = Instant::now();

        let err = ShellRunner::new()
            .with_timeout(Some(Duration::from_millis(200)))
            .run(tmp.path(), "echo started; sleep 30")
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        match err.downcast_ref::<ExternalBuildError>() {
            Some(ExternalBuildError::Timeout { output, .. }) => {
                assert!(output.contains("started"))
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_cancel_flag() {
        let tmp = tempfile::TempDir::new().unwrap();
        let flag = Arc::new(AtomicBool::new(true));

        let err = ShellRunner::new()
            .with_cancel_flag(flag)
            .run(tmp.path(), "sleep 30")
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ExternalBuildError>(),
            Some(ExternalBuildError::Cancelled { .. })
        ));
    }
}
