//! Notifier - Toasts with a Persisted Gate

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::constants::{DEFAULT_TOAST_TIMEOUT_MS, TOAST_ENABLED_KEY, TOAST_HISTORY_CAPACITY};
use crate::error::Result;
use crate::persistence::KeyValueStore;

/// Toast level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotifyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotifyLevel::Info => "INFO",
            NotifyLevel::Success => "SUCCESS",
            NotifyLevel::Warning => "WARNING",
            NotifyLevel::Error => "ERROR",
        }
    }
}

/// Per-call notify options
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyOptions {
    /// Display time; the default applies when unset
    pub timeout: Option<Duration>,
    /// Show even when toasts are turned off
    pub force: bool,
}

impl NotifyOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

/// A toast handed to the presenter
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub level: NotifyLevel,
    pub message: String,
    pub timeout: Duration,
    pub shown_at: DateTime<Local>,
}

/// Displays toasts
pub trait ToastPresenter: Send + Sync {
    fn show(&self, toast: &Toast);
}

/// Presenter that writes toasts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogToastPresenter;

impl ToastPresenter for LogToastPresenter {
    fn show(&self, toast: &Toast) {
        match toast.level {
            NotifyLevel::Info | NotifyLevel::Success => {
                info!(level = toast.level.label(), "{}", toast.message)
            }
            NotifyLevel::Warning => warn!(level = toast.level.label(), "{}", toast.message),
            NotifyLevel::Error => error!(level = toast.level.label(), "{}", toast.message),
        }
    }
}

#[derive(Debug)]
struct ToastHistory {
    recent: VecDeque<Toast>,
    next_id: u64,
}

/// Toast front-end honoring the persisted `toast_enabled` toggle
pub struct Notifier {
    store: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn ToastPresenter>,
    history: Mutex<ToastHistory>,
}

impl Notifier {
    pub fn new(store: Arc<dyn KeyValueStore>, presenter: Arc<dyn ToastPresenter>) -> Self {
        Self {
            store,
            presenter,
            history: Mutex::new(ToastHistory {
                recent: VecDeque::with_capacity(TOAST_HISTORY_CAPACITY),
                next_id: 1,
            }),
        }
    }

    /// Notifier that logs instead of drawing
    pub fn with_logging(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(LogToastPresenter))
    }

    /// Whether non-forced toasts are shown
    pub fn enabled(&self) -> bool {
        self.store.get_bool(TOAST_ENABLED_KEY, true)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.store.set(TOAST_ENABLED_KEY, enabled.into())
    }

    /// Show a toast unless the gate suppresses it
    ///
    /// Returns the toast that was shown.
    pub fn notify(
        &self,
        level: NotifyLevel,
        message: impl Into<String>,
        options: NotifyOptions,
    ) -> Option<Toast> {
        let message = message.into();
        if !options.force && !self.enabled() {
            debug!(level = level.label(), text = %message, "Toast suppressed");
            return None;
        }

        let toast = {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            let toast = Toast {
                id: history.next_id,
                level,
                message,
                timeout: options
                    .timeout
                    .unwrap_or(Duration::from_millis(DEFAULT_TOAST_TIMEOUT_MS)),
                shown_at: Local::now(),
            };
            history.next_id += 1;

            if history.recent.len() >= TOAST_HISTORY_CAPACITY {
                history.recent.pop_front();
            }
            history.recent.push_back(toast.clone());
            toast
        };

        self.presenter.show(&toast);
        Some(toast)
    }

    pub fn info(&self, message: impl Into<String>) -> Option<Toast> {
        self.notify(NotifyLevel::Info, message, NotifyOptions::default())
    }

    pub fn success(&self, message: impl Into<String>) -> Option<Toast> {
        self.notify(NotifyLevel::Success, message, NotifyOptions::default())
    }

    pub fn warning(&self, message: impl Into<String>) -> Option<Toast> {
        self.notify(NotifyLevel::Warning, message, NotifyOptions::default())
    }

    pub fn error(&self, message: impl Into<String>) -> Option<Toast> {
        self.notify(NotifyLevel::Error, message, NotifyOptions::default())
    }

    /// Recently shown toasts, oldest first
    pub fn recent(&self) -> Vec<Toast> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent
            .iter()
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.enabled())
            .finish()
    }
}
