//! Run state machine.
//!
//! ```text
//! Idle -> ValidatingInput -> Detecting -> Extracting -> Aggregating -> Complete
//!   \___________\_______________\____________\______________\-> Failed
//! ```

use std::fmt;

use crate::error::ProcessingError;

/// Lifecycle state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Idle,
    ValidatingInput,
    Detecting,
    Extracting,
    Aggregating,
    Complete,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::ValidatingInput => "validating_input",
            RunState::Detecting => "detecting",
            RunState::Extracting => "extracting",
            RunState::Aggregating => "aggregating",
            RunState::Complete => "complete",
            RunState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed)
    }

    /// The single forward successor of a non-terminal state.
    fn next(&self) -> Option<RunState> {
        match self {
            RunState::Idle => Some(RunState::ValidatingInput),
            RunState::ValidatingInput => Some(RunState::Detecting),
            RunState::Detecting => Some(RunState::Extracting),
            RunState::Extracting => Some(RunState::Aggregating),
            RunState::Aggregating => Some(RunState::Complete),
            RunState::Complete | RunState::Failed => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(&self, to: RunState) -> bool {
        if to == RunState::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks a run's state and rejects illegal transitions.
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    state: RunState,
    history: Vec<RunState>,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Move to `to`.
    pub fn advance(&mut self, to: RunState) -> Result<(), ProcessingError> {
        if !self.state.can_transition_to(to) {
            return Err(ProcessingError::new(format!(
                "Illegal run state transition: {} -> {}",
                self.state, to
            )));
        }
        tracing::debug!(from = %self.state, to = %to, "Run state transition");
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Move to `Failed`. No-op once terminal.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = RunState::Failed;
            self.history.push(RunState::Failed);
        }
    }
}
