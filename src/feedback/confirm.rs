//! Confirmer - Dialogs with a Persisted Gate

use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::REDUCE_CONFIRMATION_KEY;
use crate::error::Result;
use crate::persistence::KeyValueStore;

/// Displays blocking dialogs
pub trait DialogPresenter: Send + Sync {
    /// Ask a yes/no question
    fn confirm(&self, message: &str) -> bool;

    fn alert(&self, message: &str);
}

/// Non-interactive presenter: logs and answers with a fixed value
#[derive(Debug, Clone, Copy)]
pub struct LogDialogPresenter {
    pub answer: bool,
}

impl DialogPresenter for LogDialogPresenter {
    fn confirm(&self, message: &str) -> bool {
        info!(answer = self.answer, "Confirm: {message}");
        self.answer
    }

    fn alert(&self, message: &str) {
        info!("Alert: {message}");
    }
}

/// Dialog front-end honoring the persisted `reduce_confirmation` toggle
pub struct Confirmer {
    store: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn DialogPresenter>,
}

impl Confirmer {
    pub fn new(store: Arc<dyn KeyValueStore>, presenter: Arc<dyn DialogPresenter>) -> Self {
        Self { store, presenter }
    }

    /// Whether confirmations are skipped
    pub fn reduced(&self) -> bool {
        self.store.get_bool(REDUCE_CONFIRMATION_KEY, false)
    }

    pub fn set_reduced(&self, reduced: bool) -> Result<()> {
        self.store.set(REDUCE_CONFIRMATION_KEY, reduced.into())
    }

    /// Ask for confirmation; auto-accepts when reduced unless `force` is set
    pub fn confirm(&self, message: &str, force: bool) -> bool {
        if !force && self.reduced() {
            debug!(prompt = message, "Confirmation auto-accepted");
            return true;
        }
        self.presenter.confirm(message)
    }

    /// Show an alert; skipped when reduced. Returns whether it was shown.
    pub fn alert(&self, message: &str) -> bool {
        if self.reduced() {
            debug!(prompt = message, "Alert skipped");
            return false;
        }
        self.presenter.alert(message);
        true
    }
}

impl std::fmt::Debug for Confirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Confirmer")
            .field("reduced", &self.reduced())
            .finish()
    }
}
