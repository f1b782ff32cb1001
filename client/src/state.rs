use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Where an engine is in its connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Disconnected,
    /// Socket open, not yet authenticated
    Connected,
    /// Identity claim sent, waiting for the server to confirm it
    AwaitingChallenge,
    LoggedIn,
    /// The receive loop has exited
    Terminated,
}

/// Session flags shared between the receive loop and engine handles
#[derive(Debug)]
pub(crate) struct SessionState {
    logged_in: AtomicBool,
    waiting_to_start: AtomicBool,
    phase: Mutex<EnginePhase>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            logged_in: AtomicBool::new(false),
            waiting_to_start: AtomicBool::new(false),
            phase: Mutex::new(EnginePhase::Disconnected),
        }
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    /// Returns true only for the call that performed the transition
    pub fn mark_logged_in(&self) -> bool {
        !self.logged_in.swap(true, Ordering::AcqRel)
    }

    pub fn waiting_to_start(&self) -> bool {
        self.waiting_to_start.load(Ordering::Acquire)
    }

    pub fn set_waiting_to_start(&self, waiting: bool) {
        self.waiting_to_start.store(waiting, Ordering::Release);
    }

    pub fn phase(&self) -> EnginePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_phase(&self, phase: EnginePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}
