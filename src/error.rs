//! Error types for the intake service.
//!
//! Only [`ShellError`] ever reaches the HTTP layer. [`EnrichError`] is
//! absorbed inside the enrichment adapter, and [`StoreError`] and
//! [`WidgetError`] are wrapped by the shell before they leave it.

use crate::model::Phase;
use crate::widgets::FieldId;

/// Failures talking to the generative-text service.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("request to generative-text service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generative-text service returned no text")]
    MissingText,
    #[error("generative-text reply is not a JSON object")]
    NotAnObject,
    #[error("generative-text reply is not a usable analysis: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failures reading or writing the durable record slot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to encode records: {0}")]
    Encode(serde_json::Error),
    #[error("failed to decode stored records: {0}")]
    Decode(serde_json::Error),
    #[error("stored records use format version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// An edit that the target widget cannot apply.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("field {field} does not accept a {edit} edit")]
    WrongEdit { field: FieldId, edit: &'static str },
    #[error("field {field} has no option {value:?}")]
    UnknownOption { field: FieldId, value: String },
}

/// Errors surfaced by the application shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("form is not editable while {0}")]
    NotEditable(Phase),
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error("failed to persist records: {0}")]
    Storage(#[from] StoreError),
    #[error("admin view is locked")]
    AdminLocked,
    #[error("no record with id {0}")]
    RecordNotFound(String),
}
