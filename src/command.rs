use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, bounded};
use tracing::debug;

use crate::config::StatusSettings;
use crate::error::CommandError;

/// How often a running child is checked for exit, timeout, or cancellation.
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Source of raw battery status text.
pub trait StatusCommand: Send + Sync {
    /// Run the command once and return its trimmed standard output.
    fn run(&self, cancel: &CancelToken) -> Result<String, CommandError>;
}

/// Shared flag that aborts in-flight command invocations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs a fixed command string through a shell, e.g. `/bin/zsh -c "pmset -g batt"`.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    shell: String,
    command: String,
    timeout: Duration,
}

impl ShellCommand {
    pub fn new(shell: impl Into<String>, command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            command: command.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &StatusSettings) -> Self {
        Self::new(&settings.shell, &settings.command, settings.timeout())
    }
}

impl ShellCommand {
    fn check_abort(&self, cancel: &CancelToken, deadline: Instant) -> Option<CommandError> {
        if cancel.is_cancelled() {
            Some(CommandError::Cancelled)
        } else if Instant::now() >= deadline {
            Some(CommandError::Timeout(self.timeout))
        } else {
            None
        }
    }
}

impl StatusCommand for ShellCommand {
    fn run(&self, cancel: &CancelToken) -> Result<String, CommandError> {
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let mut child = Command::new(&self.shell)
            .args(["-c", &self.command])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(CommandError::Spawn)?;

        // Drain stdout concurrently so a chatty child never blocks on a full pipe.
        let (out_tx, out_rx) = bounded(1);
        if let Some(mut stdout) = child.stdout.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = out_tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
            });
        }

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(err) = self.check_abort(cancel, deadline) {
                debug!(command = %self.command, error = %err, "killing status command");
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
            thread::sleep(WAIT_POLL);
        };

        if !status.success() {
            return Err(CommandError::Status(status.code()));
        }

        // A background process started by the command can keep stdout open
        // after the shell exits, so the read is bounded by the same deadline.
        let bytes = loop {
            match out_rx.recv_timeout(WAIT_POLL) {
                Ok(read) => break read?,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(err) = self.check_abort(cancel, deadline) {
                        debug!(command = %self.command, error = %err, "abandoning status output");
                        return Err(err);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CommandError::Io(std::io::Error::other(
                        "stdout reader exited without output",
                    )));
                }
            }
        };

        let text = String::from_utf8(bytes)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CommandError::EmptyOutput);
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(command: &str, timeout_ms: u64) -> ShellCommand {
        ShellCommand::new("/bin/sh", command, Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_output_is_trimmed() {
        let out = sh("printf '  Now drawing from AC Power\\n 85%%;\\n\\n'", 2000)
            .run(&CancelToken::new())
            .unwrap();
        assert_eq!(out, "Now drawing from AC Power\n 85%;");
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let err = sh("true", 2000).run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, CommandError::EmptyOutput));
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let err = sh("echo partial; exit 3", 2000)
            .run(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, CommandError::Status(Some(3))));
    }

    #[test]
    fn test_missing_shell_is_spawn_error() {
        let cmd = ShellCommand::new("/nonexistent/shell", "echo hi", Duration::from_secs(1));
        let err = cmd.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, CommandError::Spawn(_)));
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let err = sh("printf '\\377\\376'", 2000)
            .run(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, CommandError::Encoding(_)));
    }

    #[test]
    fn test_hung_command_times_out() {
        let start = Instant::now();
        let err = sh("sleep 5", 150).run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_cancelled_token_short_circuits() {
        let token = CancelToken::new();
        token.cancel();
        let err = sh("echo hi", 2000).run(&token).unwrap_err();
        assert!(matches!(err, CommandError::Cancelled));
    }

    #[test]
    fn test_cancel_while_running() {
        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });
        let start = Instant::now();
        let err = sh("sleep 5", 10_000).run(&token).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, CommandError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_background_child_holding_stdout_times_out() {
        let start = Instant::now();
        let err = sh("echo ' -InternalBattery-0 50%;'; sleep 3 &", 200)
            .run(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_cancel_while_background_child_holds_stdout() {
        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });
        let start = Instant::now();
        let err = sh("echo 50%; sleep 3 &", 10_000).run(&token).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, CommandError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
