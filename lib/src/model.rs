// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Viewer state and the kernel-message classifier that feeds it.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashSet;

/// A message from the execution backend, reduced to the kinds the viewer
/// reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelMessage {
    /// The accumulated textual output of the disassembly call.
    Stream { text: String },
    /// Execution failed; `evalue` carries the exception summary.
    Error { evalue: String },
    /// Execution-state chatter such as "busy" or "idle"; ignored.
    Status { execution_state: String },
}

/// The bytecode viewer model.
///
/// Holds the latest transcript or error (whichever message arrived last
/// wins), the theme flag, and the highlighted line set. Every mutation
/// notifies subscribers, which re-read the whole snapshot; `output` and
/// `error` are not cleared in lockstep, but rendering treats a non-empty
/// error as authoritative.
#[derive(Debug, Default)]
pub struct BytecodeModel {
    output: String,
    error: String,
    is_light: bool,
    selected_lines: HashSet<usize>,
    subscribers: Vec<Sender<()>>,
}

impl BytecodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest disassembly transcript.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The latest error message, empty if the last execution succeeded.
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn is_light(&self) -> bool {
        self.is_light
    }

    pub fn set_is_light(&mut self, value: bool) {
        self.is_light = value;
        self.notify();
    }

    /// Source lines whose blocks should be highlighted.
    pub fn selected_lines(&self) -> &HashSet<usize> {
        &self.selected_lines
    }

    /// Replaces the highlight set wholesale.
    pub fn set_selected_lines(&mut self, lines: HashSet<usize>) {
        self.selected_lines = lines;
        self.notify();
    }

    /// Classifies one backend message into model state.
    ///
    /// Stream output replaces the transcript and clears any prior error; an
    /// error is stored verbatim and leaves the transcript untouched; any
    /// other kind changes nothing and fires no notification.
    pub fn handle_kernel_message(&mut self, msg: &KernelMessage) {
        match msg {
            KernelMessage::Stream { text } => {
                self.output = normalize_transcript(text);
                self.error.clear();
                self.notify();
            }
            KernelMessage::Error { evalue } => {
                error!("kernel error: {evalue}");
                self.error = evalue.clone();
                self.notify();
            }
            KernelMessage::Status { .. } => {}
        }
    }

    /// Registers a change listener. One tick is sent per mutation.
    pub fn subscribe(&mut self) -> Receiver<()> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Notifies all live subscribers, dropping disconnected ones.
    pub fn notify(&mut self) {
        self.subscribers.retain(|tx| tx.send(()).is_ok());
    }
}

/// Normalizes a transcript to exactly one trailing newline; empty text stays
/// empty.
fn normalize_transcript(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut normalized = text
        .trim_end_matches(|c| c == '\r' || c == '\n')
        .to_string();
    normalized.push('\n');
    normalized
}
