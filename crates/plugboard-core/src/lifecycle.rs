//! Lifecycle management.
//!
//! Provides:
//! - [`Lifecycle`], the optional start/stop callbacks packages and tools
//!   can declare
//! - [`RegistryState`], the state machine guarding root start/stop

use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;

use plugboard_protocols::{RegistryError, Result};

use crate::root::Registry;

/// Start/stop callbacks receiving the root registry.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    async fn start(&self, _ctx: &Registry) -> Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: &Registry) -> Result<()> {
        Ok(())
    }
}

/// Registry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegistryState {
    /// Initial state, not started.
    Created = 0,
    /// Package and sub-registry starts in progress.
    Starting = 1,
    /// Running; newly installed entries are started immediately.
    Running = 2,
    /// Sub-registry and package stops in progress.
    Stopping = 3,
    /// Stopped. May be started again.
    Stopped = 4,
    /// A start failed part way. Must be stopped before starting again.
    Failed = 5,
}

impl From<u8> for RegistryState {
    fn from(v: u8) -> Self {
        match v {
            0 => RegistryState::Created,
            1 => RegistryState::Starting,
            2 => RegistryState::Running,
            3 => RegistryState::Stopping,
            4 => RegistryState::Stopped,
            5 => RegistryState::Failed,
            _ => RegistryState::Created,
        }
    }
}

/// Atomic holder for [`RegistryState`] with checked transitions.
pub(crate) struct StateCell {
    state: AtomicU8,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(RegistryState::Created as u8),
        }
    }

    pub(crate) fn get(&self) -> RegistryState {
        RegistryState::from(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: RegistryState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Moves to `Starting` from `Created` or `Stopped`.
    pub(crate) fn begin_start(&self) -> Result<()> {
        for from in [RegistryState::Created, RegistryState::Stopped] {
            if self.transition(from, RegistryState::Starting) {
                return Ok(());
            }
        }
        Err(RegistryError::InvalidState(format!(
            "Cannot start from state: {:?}",
            self.get()
        )))
    }

    /// Moves to `Stopping` from `Running` or `Failed`.
    pub(crate) fn begin_stop(&self) -> Result<()> {
        for from in [RegistryState::Running, RegistryState::Failed] {
            if self.transition(from, RegistryState::Stopping) {
                return Ok(());
            }
        }
        Err(RegistryError::InvalidState(format!(
            "Cannot stop from state: {:?}",
            self.get()
        )))
    }

    fn transition(&self, from: RegistryState, to: RegistryState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
