// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A Python interpreter subprocess standing in for a remote kernel.

use crate::model::KernelMessage;
use std::process::Command;
use thiserror::Error;

/// Interpreter used when none is configured.
pub const DEFAULT_PYTHON: &str = "python3";

/// Errors raised while driving the interpreter.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unable to launch `{python}`: {source}")]
    Spawn {
        python: String,
        source: std::io::Error,
    },
    #[error("unexpected I/O error, caused by: {0}")]
    Io(#[from] std::io::Error),
    #[error("interpreter produced non-UTF-8 output")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type SessionResult<T = ()> = Result<T, SessionError>;

/// Runs disassembly commands through a Python interpreter.
///
/// Each execution is a fresh `python -c` child process whose captured output
/// is replayed as the message sequence a kernel would stream. In-flight
/// executions are never cancelled; callers feed whatever arrives into the
/// model and the last message wins.
#[derive(Debug, Clone)]
pub struct PythonSession {
    python: String,
}

impl Default for PythonSession {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl PythonSession {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    pub fn python(&self) -> &str {
        &self.python
    }

    /// Executes `code` and returns the resulting message stream: a busy
    /// status, the stdout transcript if any, the exception summary if the
    /// interpreter failed, and an idle status.
    pub fn execute(&self, code: &str) -> SessionResult<Vec<KernelMessage>> {
        debug!("executing {} bytes with `{}`", code.len(), self.python);

        let output = Command::new(&self.python)
            .arg("-c")
            .arg(code)
            .output()
            .map_err(|source| SessionError::Spawn {
                python: self.python.clone(),
                source,
            })?;

        let stdout = String::from_utf8(output.stdout)?;
        let stderr = String::from_utf8(output.stderr)?;

        let mut messages = vec![KernelMessage::Status {
            execution_state: "busy".into(),
        }];

        if !stdout.is_empty() {
            messages.push(KernelMessage::Stream { text: stdout });
        }

        if !output.status.success() {
            // Python prints the exception summary on the last line of the
            // traceback.
            let evalue = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("interpreter exited with an error")
                .to_string();
            messages.push(KernelMessage::Error { evalue });
        }

        messages.push(KernelMessage::Status {
            execution_state: "idle".into(),
        });

        info!("execution finished: {}", output.status);

        Ok(messages)
    }
}
