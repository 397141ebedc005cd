//! Page-by-page recording state.
//!
//! A session is a contiguous run of recording pages sharing one grid. Layout A
//! latches a fuse on its stop phrase and never records again; layout B drops
//! back to idle and may open another session on a later start trigger.

use crate::grid::MasterGrid;
use crate::limits::StopSignal;

/// How a layout moves between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// A confirmed stop blows the fuse instead of returning to idle.
    pub fuse: bool,
    /// Repeated column labels near the top of a page open a session.
    pub header_wake_up: bool,
    /// A start trigger while recording opens a fresh session with a new grid.
    pub restart_on_trigger: bool,
}

/// What a page announces before any rows are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub start_trigger: bool,
    pub wake_up: bool,
}

/// Decision for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Skip,
    StartSession,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub grid: MasterGrid,
    /// Index of the session's first row in the document output
    pub first_row: usize,
    /// Orphan text waiting for the session's first row
    pub pending_text: String,
}

impl Session {
    pub fn new(grid: MasterGrid, first_row: usize) -> Self {
        Self {
            grid,
            first_row,
            pending_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Recording(Session),
    /// Terminal: every later page is ignored.
    Fused,
}

impl SessionState {
    pub fn admit(&self, policy: SessionPolicy, signals: PageSignals) -> PageAction {
        match self {
            SessionState::Fused => PageAction::Skip,
            SessionState::Idle => {
                if signals.start_trigger || (policy.header_wake_up && signals.wake_up) {
                    PageAction::StartSession
                } else {
                    PageAction::Skip
                }
            }
            SessionState::Recording(_) => {
                if signals.start_trigger && policy.restart_on_trigger {
                    PageAction::StartSession
                } else {
                    PageAction::Continue
                }
            }
        }
    }

    /// State after a recorded page, given its stop signal.
    pub fn close_page(self, stop: StopSignal, policy: SessionPolicy) -> SessionState {
        match self {
            SessionState::Recording(_) if stop.confirmed => {
                if policy.fuse {
                    SessionState::Fused
                } else {
                    SessionState::Idle
                }
            }
            other => other,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Recording(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_fused(&self) -> bool {
        matches!(self, SessionState::Fused)
    }
}
