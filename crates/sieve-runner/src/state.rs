// state.rs — Lifecycle of a single run.
//
//   Init → Staging → Running(pkg)* → Reporting → Done
//                        │               ▲
//                        └──→ Aborted ───┘
//
// Aborted is only reachable from Running (fail-fast after a failed
// command); the run still goes through Reporting afterwards.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Init,
    Staging,
    Running { package: String },
    Reporting,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Init => write!(f, "init"),
            RunState::Staging => write!(f, "staging"),
            RunState::Running { package } => write!(f, "running({package})"),
            RunState::Reporting => write!(f, "reporting"),
            RunState::Done => write!(f, "done"),
            RunState::Aborted => write!(f, "aborted"),
        }
    }
}

impl RunState {
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Init, RunState::Staging)
                | (RunState::Staging, RunState::Running { .. })
                | (RunState::Staging, RunState::Reporting)
                | (RunState::Running { .. }, RunState::Running { .. })
                | (RunState::Running { .. }, RunState::Reporting)
                | (RunState::Running { .. }, RunState::Aborted)
                | (RunState::Aborted, RunState::Reporting)
                | (RunState::Reporting, RunState::Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done)
    }
}
