//! Data models for the intake service.
//!
//! Serialised field names follow the stored record format (`operador`,
//! `tipo`, `dataVoo`, ...) so that existing exports load unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Summary shown when the generative-text service could not be used.
pub const FALLBACK_SUMMARY: &str = "Análise indisponível no momento.";

/// One submitted incident report.
///
/// Records are immutable once created. The shell keeps them newest first and
/// never edits or deletes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Opaque unique identifier assigned at submission.
    pub id: String,

    /// Submission time in epoch milliseconds.
    pub timestamp: i64,

    /// Name of the agent who registered the case.
    #[serde(rename = "operador")]
    pub operator: String,

    /// Impact-type tags in selection order (e.g. `FF`, `BAG`).
    #[serde(rename = "tipo", default)]
    pub impact_types: Vec<String>,

    /// Ticket or protocol numbers, free text. Several values may be present.
    #[serde(rename = "tkt", default)]
    pub ticket: String,

    /// Booking locators, free text. Several values may be present.
    #[serde(rename = "localizador", default)]
    pub locator: String,

    /// Flight date in `DD/MM/YYYY` display form. Not calendar-checked.
    #[serde(rename = "dataVoo", default)]
    pub flight_date: String,

    /// Free-text narrative of the incident.
    #[serde(rename = "bio", default)]
    pub narrative: String,
}

/// Values of the entry form that have not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(rename = "operador")]
    pub operator: String,
    #[serde(rename = "tipo")]
    pub impact_types: Vec<String>,
    #[serde(rename = "tkt")]
    pub ticket: String,
    #[serde(rename = "localizador")]
    pub locator: String,
    #[serde(rename = "dataVoo")]
    pub flight_date: String,
    #[serde(rename = "bio")]
    pub narrative: String,
}

impl FormData {
    /// Freeze the current form values into a record.
    pub fn to_record(&self, id: String, timestamp: i64) -> UserData {
        UserData {
            id,
            timestamp,
            operator: self.operator.clone(),
            impact_types: self.impact_types.clone(),
            ticket: self.ticket.clone(),
            locator: self.locator.clone(),
            flight_date: self.flight_date.clone(),
            narrative: self.narrative.clone(),
        }
    }
}

/// Structured reply expected from the generative-text service.
///
/// Only `summary` is required. The other fields default to empty when the
/// reply leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    /// Professional greeting addressed to the agent.
    #[serde(default)]
    pub greeting: String,

    /// Title of the service case.
    #[serde(default)]
    pub professional_title: String,

    /// Refined technical narrative.
    #[serde(default)]
    pub improved_bio: String,

    /// Suggested technical tags.
    #[serde(default)]
    pub suggested_tags: Vec<String>,

    /// One-sentence summary.
    pub summary: String,
}

/// Outcome of enriching one record: either the parsed reply or the fixed
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AiAnalysis {
    Structured(StructuredAnalysis),
    Fallback { summary: String },
}

impl AiAnalysis {
    /// The fallback used whenever enrichment fails.
    pub fn fallback() -> Self {
        AiAnalysis::Fallback {
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }

    /// The one-line summary shown to the agent.
    pub fn summary(&self) -> &str {
        match self {
            AiAnalysis::Structured(analysis) => &analysis.summary,
            AiAnalysis::Fallback { summary } => summary,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AiAnalysis::Fallback { .. })
    }
}

/// Submission lifecycle of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Form editable.
    Idle,
    /// Waiting for enrichment; form disabled.
    Submitting,
    /// Success panel shown with the analysis summary.
    Success,
    /// The record could not be persisted; form kept for another attempt.
    Error,
}

impl Phase {
    /// Whether the form accepts edits and submission.
    pub fn is_editable(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "IDLE",
            Phase::Submitting => "SUBMITTING",
            Phase::Success => "SUCCESS",
            Phase::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Which top-level view is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    /// Operator entry form.
    Entry,
    /// Password-gated record list.
    Admin,
}
