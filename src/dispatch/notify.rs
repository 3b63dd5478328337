use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DISMISS_DELAY: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct Display {
    current: Option<Notification>,
    visible: bool,
    // Bumped on every show; a dismissal only applies to its own generation.
    generation: u64,
}

/// The single notification display shared by every action.
///
/// Last write wins: each call replaces what is shown and pushes the
/// dismissal back by the full delay. Hiding keeps the text around.
#[derive(Debug, Clone)]
pub struct Notifier {
    display: Arc<Mutex<Display>>,
    delay: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_DELAY)
    }
}

impl Notifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            display: Arc::new(Mutex::new(Display::default())),
            delay,
        }
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(text, Severity::Error);
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let generation = {
            let mut display = self.lock();
            display.current = Some(Notification {
                text: text.into(),
                severity,
            });
            display.visible = true;
            display.generation += 1;
            display.generation
        };

        let display = Arc::clone(&self.display);
        let deadline = Instant::now() + self.delay;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut display = display.lock().unwrap_or_else(PoisonError::into_inner);
            if display.generation == generation {
                display.visible = false;
            }
        });
    }

    /// The notification currently on screen, if any.
    pub fn visible(&self) -> Option<Notification> {
        let display = self.lock();
        if display.visible {
            display.current.clone()
        } else {
            None
        }
    }

    /// The last notification shown, whether or not it has been dismissed.
    pub fn last(&self) -> Option<Notification> {
        self.lock().current.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Display> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
