//! Pure rendering of the shell state into screens.
//!
//! A [`Screen`] describes what is shown (labels, values, enabled controls)
//! without any markup or styling.

use serde::Serialize;

use crate::model::{Phase, UserData, View};
use crate::shell::ShellState;
use crate::widgets::{ENTRY_FORM, FieldSpec, FieldValue};

pub const FORM_TITLE: &str = "Registro de Atendimento";
pub const SUBMIT_LABEL: &str = "Transmitir Dados";
pub const SUBMITTING_LABEL: &str = "Processando...";
pub const SUCCESS_HEADLINE: &str = "Sincronizado!";
pub const RESET_LABEL: &str = "NOVO REGISTRO";

/// The screen currently displayed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    EntryForm(EntryForm),
    Success(SuccessPanel),
    AdminList(AdminList),
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryForm {
    pub title: &'static str,
    pub phase: Phase,
    pub fields: Vec<RenderedField>,
    pub submit: SubmitButton,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub value: FieldValue,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitButton {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessPanel {
    pub headline: &'static str,
    pub summary: String,
    /// The summary as displayed, in quotes.
    pub quoted_summary: String,
    pub reset_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminList {
    pub heading: String,
    pub count: usize,
    pub rows: Vec<AdminRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminRow {
    pub id: String,
    /// `{locator} - {operator}`
    pub title: String,
    pub flight_date: String,
}

/// Render whichever screen the state calls for.
pub fn render(state: &ShellState) -> Screen {
    match (state.view, state.phase) {
        (View::Admin, _) => Screen::AdminList(admin_list(&state.records)),
        (View::Entry, Phase::Success) => Screen::Success(success_panel(state)),
        (View::Entry, _) => Screen::EntryForm(entry_form(state)),
    }
}

pub fn entry_form(state: &ShellState) -> EntryForm {
    let disabled = !state.phase.is_editable();
    let fields = ENTRY_FORM
        .iter()
        .map(|spec| RenderedField {
            spec: *spec,
            value: state.form.value(spec.id),
            disabled,
        })
        .collect();

    EntryForm {
        title: FORM_TITLE,
        phase: state.phase,
        fields,
        submit: SubmitButton {
            label: if state.phase == Phase::Submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            disabled,
        },
        error: state.error.clone(),
    }
}

pub fn success_panel(state: &ShellState) -> SuccessPanel {
    let summary = state
        .analysis
        .as_ref()
        .map(|a| a.summary().to_string())
        .unwrap_or_default();

    SuccessPanel {
        headline: SUCCESS_HEADLINE,
        quoted_summary: format!("\"{summary}\""),
        summary,
        reset_label: RESET_LABEL,
    }
}

pub fn admin_list(records: &[UserData]) -> AdminList {
    AdminList {
        heading: format!("FILA DE ATENDIMENTO ({})", records.len()),
        count: records.len(),
        rows: records
            .iter()
            .map(|r| AdminRow {
                id: r.id.clone(),
                title: format!("{} - {}", r.locator, r.operator),
                flight_date: r.flight_date.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AiAnalysis;

    fn record(id: &str, locator: &str, operator: &str) -> UserData {
        UserData {
            id: id.to_string(),
            timestamp: 1,
            operator: operator.to_string(),
            impact_types: vec![],
            ticket: String::new(),
            locator: locator.to_string(),
            flight_date: "15/03/2025".to_string(),
            narrative: String::new(),
        }
    }

    #[test]
    fn test_idle_form() {
        let state = ShellState::new(vec![]);
        let Screen::EntryForm(form) = render(&state) else {
            panic!("expected entry form");
        };
        assert_eq!(form.title, FORM_TITLE);
        assert_eq!(form.fields.len(), ENTRY_FORM.len());
        assert_eq!(form.submit.label, SUBMIT_LABEL);
        assert!(!form.submit.disabled);
        assert!(form.fields.iter().all(|f| !f.disabled));
    }

    #[test]
    fn test_submitting_form_is_disabled() {
        let mut state = ShellState::new(vec![]);
        state.phase = Phase::Submitting;

        let form = entry_form(&state);
        assert_eq!(form.submit.label, SUBMITTING_LABEL);
        assert!(form.submit.disabled);
        assert!(form.fields.iter().all(|f| f.disabled));
    }

    #[test]
    fn test_success_panel_quotes_summary() {
        let mut state = ShellState::new(vec![]);
        state.phase = Phase::Success;
        state.analysis = Some(AiAnalysis::Fallback {
            summary: "Caso registrado.".to_string(),
        });

        let Screen::Success(panel) = render(&state) else {
            panic!("expected success panel");
        };
        assert_eq!(panel.summary, "Caso registrado.");
        assert_eq!(panel.quoted_summary, "\"Caso registrado.\"");
        assert_eq!(panel.headline, SUCCESS_HEADLINE);
    }

    #[test]
    fn test_error_shown_on_form() {
        let mut state = ShellState::new(vec![]);
        state.phase = Phase::Error;
        state.error = Some("falhou".to_string());

        let form = entry_form(&state);
        assert_eq!(form.error.as_deref(), Some("falhou"));
        assert!(!form.submit.disabled);
    }

    #[test]
    fn test_admin_list_rows() {
        let mut state = ShellState::new(vec![
            record("2", "DEF456", "Bia"),
            record("1", "ABC123", "Ana"),
        ]);
        state.view = View::Admin;

        let Screen::AdminList(list) = render(&state) else {
            panic!("expected admin list");
        };
        assert_eq!(list.heading, "FILA DE ATENDIMENTO (2)");
        assert_eq!(list.rows[0].title, "DEF456 - Bia");
        assert_eq!(list.rows[1].id, "1");
    }

    #[test]
    fn test_screen_json_shape() {
        let value = serde_json::to_value(render(&ShellState::new(vec![]))).unwrap();
        assert_eq!(value["screen"], "entry_form");
        assert_eq!(value["fields"][0]["id"], "operador");
        assert_eq!(value["fields"][0]["widget"], "text");
        assert_eq!(value["fields"][1]["widget"], "date");
        assert_eq!(value["fields"][2]["options"][1]["label"], "Bagagem");
        assert_eq!(value["fields"][2]["value"], serde_json::json!([]));
    }
}
