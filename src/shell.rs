//! Application shell.
//!
//! [`Shell`] owns the whole application state: the entry form, the record
//! list, the submission phase, the current view and the last analysis. All
//! mutations go through its methods; rendering reads a [`ShellState`] by
//! reference (see [`crate::view`]).
//!
//! # Submission
//!
//! `IDLE → SUBMITTING → SUCCESS`. The enrichment call is made with the state
//! lock released, after the phase has moved to `SUBMITTING`, so a competing
//! submit is rejected instead of queued. Enrichment never fails, so the only
//! way to reach `ERROR` is a failed write of the record list.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::enrichment::Enricher;
use crate::error::{ShellError, StoreError};
use crate::gate::{AdminGate, GateOutcome};
use crate::model::{AiAnalysis, FormData, Phase, UserData, View};
use crate::storage::RecordStore;
use crate::view::{self, Screen};
use crate::widgets::{FieldEdit, FieldId, field_spec};

/// Message shown on the form after the record list could not be written.
pub const SAVE_FAILED_MESSAGE: &str = "Falha ao salvar o registro. Tente novamente.";

/// Everything the screens are rendered from.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub form: FormData,
    /// Newest first.
    pub records: Vec<UserData>,
    pub phase: Phase,
    pub view: View,
    /// Set in `SUCCESS`, dropped on reset.
    pub analysis: Option<AiAnalysis>,
    /// Set in `ERROR`.
    pub error: Option<String>,
}

impl ShellState {
    pub fn new(records: Vec<UserData>) -> Self {
        Self {
            form: FormData::default(),
            records,
            phase: Phase::Idle,
            view: View::Entry,
            analysis: None,
            error: None,
        }
    }
}

/// Controller for the single interactive session.
pub struct Shell {
    state: Mutex<ShellState>,
    enricher: Arc<dyn Enricher>,
    store: Arc<dyn RecordStore>,
    gate: AdminGate,
}

impl Shell {
    /// Load the stored records and start in the idle entry view.
    pub async fn start(
        enricher: Arc<dyn Enricher>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, StoreError> {
        let records = store.load().await?;
        info!(record_count = records.len(), "Records loaded");

        Ok(Self {
            state: Mutex::new(ShellState::new(records)),
            enricher,
            store,
            gate: AdminGate::default(),
        })
    }

    /// Render the current screen.
    pub async fn screen(&self) -> Screen {
        view::render(&*self.state.lock().await)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> ShellState {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn current_view(&self) -> View {
        self.state.lock().await.view
    }

    /// Apply one widget edit to the form.
    pub async fn edit(&self, field: FieldId, edit: FieldEdit) -> Result<(), ShellError> {
        let mut state = self.state.lock().await;
        if !state.phase.is_editable() {
            return Err(ShellError::NotEditable(state.phase));
        }

        let current = state.form.value(field);
        let next = field_spec(field).apply(&current, edit)?;
        state.form.set_value(field, next)?;
        Ok(())
    }

    /// Submit the form: build the record, enrich it, persist the list.
    ///
    /// Returns the analysis shown on the success panel. The fallback analysis
    /// counts as success.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<AiAnalysis, ShellError> {
        let record = {
            let mut state = self.state.lock().await;
            if !state.phase.is_editable() {
                return Err(ShellError::NotEditable(state.phase));
            }

            let missing = state.form.missing_required();
            if !missing.is_empty() {
                return Err(ShellError::MissingRequired(missing));
            }

            state.phase = Phase::Submitting;
            state.error = None;
            state
                .form
                .to_record(Uuid::new_v4().to_string(), Utc::now().timestamp_millis())
        };

        info!(record_id = %record.id, "Submitting record");
        let analysis = self.enricher.enhance(&record).await;

        let mut state = self.state.lock().await;
        let mut updated = Vec::with_capacity(state.records.len() + 1);
        updated.push(record);
        updated.extend(state.records.iter().cloned());

        match self.store.save(&updated).await {
            Ok(()) => {
                info!(
                    record_id = %updated[0].id,
                    record_count = updated.len(),
                    fallback = analysis.is_fallback(),
                    "Record registered"
                );
                state.records = updated;
                state.analysis = Some(analysis.clone());
                state.phase = Phase::Success;
                Ok(analysis)
            }
            Err(e) => {
                warn!(record_id = %updated[0].id, error = %e, "Failed to persist records");
                state.phase = Phase::Error;
                state.error = Some(SAVE_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }

    /// Clear the form and return to `IDLE`.
    pub async fn reset(&self) -> Result<(), ShellError> {
        let mut state = self.state.lock().await;
        if state.phase == Phase::Submitting {
            return Err(ShellError::NotEditable(state.phase));
        }

        state.form = FormData::default();
        state.analysis = None;
        state.error = None;
        state.phase = Phase::Idle;
        Ok(())
    }

    /// Switch to the entry form. Needs no password.
    pub async fn show_entry(&self) {
        self.state.lock().await.view = View::Entry;
    }

    /// Try to open the admin view. A wrong password leaves the view as is.
    pub async fn unlock_admin(&self, attempt: &str) -> GateOutcome {
        let outcome = self.gate.check(attempt);
        match outcome {
            GateOutcome::Granted => {
                self.state.lock().await.view = View::Admin;
                info!("Admin view unlocked");
            }
            GateOutcome::Denied { .. } => warn!("Admin unlock denied"),
        }
        outcome
    }

    /// All records, newest first. Admin view only.
    pub async fn records(&self) -> Result<Vec<UserData>, ShellError> {
        let state = self.state.lock().await;
        if state.view != View::Admin {
            return Err(ShellError::AdminLocked);
        }
        Ok(state.records.clone())
    }

    /// One record by id. Admin view only.
    pub async fn record(&self, id: &str) -> Result<UserData, ShellError> {
        let state = self.state.lock().await;
        if state.view != View::Admin {
            return Err(ShellError::AdminLocked);
        }
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ShellError::RecordNotFound(id.to_string()))
    }
}
