//! Subprocess execution for assembled command lines.
//!
//! The runner is deliberately mechanical: it launches the first token as the
//! program, passes the rest as arguments, blocks until the child exits and
//! hands back the exit code with captured output. A non-zero exit code is a
//! normal [`ProcessOutput`], not an error; only a failure to *launch* the
//! program is. Deciding whether a non-zero exit matters is left to the caller
//! (see [`crate::pipeline::ensure_success`]).
//!
//! There is no timeout: a hung tool blocks the caller indefinitely.

use crate::error::Pdf2TxtError;
use serde::Serialize;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, warn};

/// Exit status and captured streams of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes an ordered token sequence as a subprocess.
pub trait ProcessRunner {
    fn execute(&self, tokens: &[String]) -> Result<ProcessOutput, Pdf2TxtError>;
}

/// Runs commands with [`std::process::Command`], synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, tokens: &[String]) -> Result<ProcessOutput, Pdf2TxtError> {
        let (program, args) = tokens
            .split_first()
            .ok_or_else(|| Pdf2TxtError::Internal("cannot execute an empty command".into()))?;

        debug!("Executing: {}", tokens.join(" "));
        let start = Instant::now();

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Pdf2TxtError::SpawnFailed {
                program: program.clone(),
                source: e,
            })?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        let elapsed_ms = start.elapsed().as_millis();
        if result.success() {
            debug!("{program} exited 0 after {elapsed_ms}ms");
        } else {
            warn!(
                "{program} exited with {:?} after {elapsed_ms}ms: {}",
                result.exit_code,
                result.stderr.trim()
            );
        }
        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_internal_error() {
        let err = SystemRunner.execute(&[]).unwrap_err();
        assert!(matches!(err, Pdf2TxtError::Internal(_)));
    }

    #[test]
    fn missing_binary_is_spawn_failure() {
        let tokens = vec!["pdf2txt-no-such-binary-xyz".to_string(), "--version".to_string()];
        let err = SystemRunner.execute(&tokens).unwrap_err();
        assert!(
            matches!(err, Pdf2TxtError::SpawnFailed { ref program, .. } if program == "pdf2txt-no-such-binary-xyz")
        );
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_reported_not_raised() {
        let tokens = vec!["sh".to_string(), "-c".to_string(), "echo oops >&2; exit 3".to_string()];
        let out = SystemRunner.execute(&tokens).unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_captured() {
        let tokens = vec!["echo".to_string(), "hello".to_string()];
        let out = SystemRunner.execute(&tokens).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "hello\n");
    }
}
