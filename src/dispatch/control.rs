use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub label: String,
}

/// Shared handle to one trigger control (a button or a selector).
///
/// The UI reads it on every frame; the action in flight owns a [`BusyGuard`]
/// that flips it back to idle when dropped.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    id: String,
    state: Arc<Mutex<ControlState>>,
}

impl ControlHandle {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(ControlState {
                enabled: true,
                label: label.into(),
            })),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> ControlState {
        self.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Disable the control and optionally swap in `busy_label`.
    ///
    /// Returns `None` when the control is already disabled, so at most one
    /// action per control is ever in flight.
    pub fn acquire(&self, busy_label: Option<&str>, idle_label: Option<&str>) -> Option<BusyGuard> {
        let mut state = self.lock();
        if !state.enabled {
            return None;
        }
        state.enabled = false;
        if let Some(label) = busy_label {
            state.label = label.to_string();
        }
        Some(BusyGuard {
            control: self.clone(),
            idle_label: idle_label.map(str::to_string),
        })
    }

    // A panic elsewhere must not keep the control stuck in busy.
    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the control to idle on drop, including during unwinding.
#[derive(Debug)]
pub struct BusyGuard {
    control: ControlHandle,
    idle_label: Option<String>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = self.control.lock();
        state.enabled = true;
        if let Some(label) = self.idle_label.take() {
            state.label = label;
        }
    }
}
