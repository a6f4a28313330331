//! Field widgets of the entry form.
//!
//! A widget never stores a value. It receives the current value of its field
//! and one edit, and returns the complete new value; the form owned by the
//! shell stays the single source of truth.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::model::FormData;

/// Maximum number of digits kept by the date mask (`DDMMYYYY`).
const DATE_DIGITS: usize = 8;

/// Identifies one field of the entry form.
///
/// The serialised names match the stored record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldId {
    #[serde(rename = "operador")]
    Operator,
    #[serde(rename = "dataVoo")]
    FlightDate,
    #[serde(rename = "tipo")]
    ImpactTypes,
    #[serde(rename = "tkt")]
    Ticket,
    #[serde(rename = "localizador")]
    Locator,
    #[serde(rename = "bio")]
    Narrative,
}

impl FieldId {
    pub fn key(&self) -> &'static str {
        match self {
            FieldId::Operator => "operador",
            FieldId::FlightDate => "dataVoo",
            FieldId::ImpactTypes => "tipo",
            FieldId::Ticket => "tkt",
            FieldId::Locator => "localizador",
            FieldId::Narrative => "bio",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One choice offered by a select widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// The control a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Free text. `rows` is set for a multi-line text area.
    Text {
        placeholder: &'static str,
        rows: Option<u8>,
    },
    /// Text passed through [`mask_date`] on every edit.
    Date { placeholder: &'static str },
    /// Set of tags; each edit toggles one option.
    MultiSelect { options: &'static [SelectOption] },
    /// One option value, or empty for no selection.
    SingleSelect {
        placeholder: &'static str,
        options: &'static [SelectOption],
    },
}

/// Static description of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub id: FieldId,
    pub label: &'static str,
    /// Checked for presence at submit; not otherwise validated.
    pub required: bool,
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// The current value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
}

/// A single user edit, as reported by a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldEdit {
    /// The full new content of a text or date control.
    Input(String),
    /// One option of a multi-select was clicked.
    Toggle(String),
    /// One option of a single-select was chosen.
    Select(String),
}

impl FieldEdit {
    fn kind(&self) -> &'static str {
        match self {
            FieldEdit::Input(_) => "input",
            FieldEdit::Toggle(_) => "toggle",
            FieldEdit::Select(_) => "select",
        }
    }
}

/// Impact types an agent can attach to a record.
pub const IMPACT_OPTIONS: &[SelectOption] = &[
    SelectOption {
        value: "FF",
        label: "FF",
    },
    SelectOption {
        value: "BAG",
        label: "Bagagem",
    },
];

/// Fields of the entry form, in display order.
pub static ENTRY_FORM: [FieldSpec; 6] = [
    FieldSpec {
        id: FieldId::Operator,
        label: "Agente",
        required: true,
        kind: WidgetKind::Text {
            placeholder: "Nome",
            rows: None,
        },
    },
    FieldSpec {
        id: FieldId::FlightDate,
        label: "Data do Voo",
        required: true,
        kind: WidgetKind::Date {
            placeholder: "DD/MM/AAAA",
        },
    },
    FieldSpec {
        id: FieldId::ImpactTypes,
        label: "Impacto",
        required: false,
        kind: WidgetKind::MultiSelect {
            options: IMPACT_OPTIONS,
        },
    },
    FieldSpec {
        id: FieldId::Ticket,
        label: "TKT / Protocolos",
        required: false,
        kind: WidgetKind::Text {
            placeholder: "Um ou mais números",
            rows: None,
        },
    },
    FieldSpec {
        id: FieldId::Locator,
        label: "Localizadores",
        required: false,
        kind: WidgetKind::Text {
            placeholder: "Um ou mais localizadores",
            rows: None,
        },
    },
    FieldSpec {
        id: FieldId::Narrative,
        label: "Relato",
        required: true,
        kind: WidgetKind::Text {
            placeholder: "Detalhes...",
            rows: Some(4),
        },
    },
];

/// Look up the spec of a form field.
pub fn field_spec(id: FieldId) -> &'static FieldSpec {
    let index = match id {
        FieldId::Operator => 0,
        FieldId::FlightDate => 1,
        FieldId::ImpactTypes => 2,
        FieldId::Ticket => 3,
        FieldId::Locator => 4,
        FieldId::Narrative => 5,
    };
    &ENTRY_FORM[index]
}

/// Reformat raw date input as `DD/MM/YYYY`.
///
/// Non-digits are discarded, at most eight digits are kept, and a separator
/// is inserted before the third and fifth digit. The whole content is
/// re-masked on every edit, so the result does not depend on where the cursor
/// was. The digits are not checked against a calendar.
pub fn mask_date(raw: &str) -> String {
    let mut masked = String::with_capacity(DATE_DIGITS + 2);
    for (i, digit) in raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(DATE_DIGITS)
        .enumerate()
    {
        if i == 2 || i == 4 {
            masked.push('/');
        }
        masked.push(digit);
    }
    masked
}

/// Toggle `tag` in a selection: drop it if present, append it otherwise.
pub fn toggle_tag(selected: &[String], tag: &str) -> Vec<String> {
    if selected.iter().any(|t| t == tag) {
        selected.iter().filter(|t| *t != tag).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(tag.to_string());
        next
    }
}

impl FieldSpec {
    /// Apply one edit to the current value and return the new value.
    pub fn apply(&self, current: &FieldValue, edit: FieldEdit) -> Result<FieldValue, WidgetError> {
        match (&self.kind, edit) {
            (WidgetKind::Text { .. }, FieldEdit::Input(text)) => Ok(FieldValue::Text(text)),
            (WidgetKind::Date { .. }, FieldEdit::Input(text)) => {
                Ok(FieldValue::Text(mask_date(&text)))
            }
            (WidgetKind::MultiSelect { options }, FieldEdit::Toggle(tag)) => {
                self.check_option(options, &tag)?;
                let selected: &[String] = match current {
                    FieldValue::Tags(tags) => tags.as_slice(),
                    FieldValue::Text(_) => &[],
                };
                Ok(FieldValue::Tags(toggle_tag(selected, &tag)))
            }
            (WidgetKind::SingleSelect { options, .. }, FieldEdit::Select(value)) => {
                if !value.is_empty() {
                    self.check_option(options, &value)?;
                }
                Ok(FieldValue::Text(value))
            }
            (_, edit) => Err(WidgetError::WrongEdit {
                field: self.id,
                edit: edit.kind(),
            }),
        }
    }

    fn check_option(&self, options: &[SelectOption], value: &str) -> Result<(), WidgetError> {
        if options.iter().any(|opt| opt.value == value) {
            Ok(())
        } else {
            Err(WidgetError::UnknownOption {
                field: self.id,
                value: value.to_string(),
            })
        }
    }
}

impl FormData {
    /// Current value of a field.
    pub fn value(&self, id: FieldId) -> FieldValue {
        match id {
            FieldId::ImpactTypes => FieldValue::Tags(self.impact_types.clone()),
            FieldId::Operator => FieldValue::Text(self.operator.clone()),
            FieldId::FlightDate => FieldValue::Text(self.flight_date.clone()),
            FieldId::Ticket => FieldValue::Text(self.ticket.clone()),
            FieldId::Locator => FieldValue::Text(self.locator.clone()),
            FieldId::Narrative => FieldValue::Text(self.narrative.clone()),
        }
    }

    /// Replace the value of a field.
    pub fn set_value(&mut self, id: FieldId, value: FieldValue) -> Result<(), WidgetError> {
        match (id, value) {
            (FieldId::ImpactTypes, FieldValue::Tags(tags)) => self.impact_types = tags,
            (FieldId::Operator, FieldValue::Text(text)) => self.operator = text,
            (FieldId::FlightDate, FieldValue::Text(text)) => self.flight_date = text,
            (FieldId::Ticket, FieldValue::Text(text)) => self.ticket = text,
            (FieldId::Locator, FieldValue::Text(text)) => self.locator = text,
            (FieldId::Narrative, FieldValue::Text(text)) => self.narrative = text,
            (field, value) => {
                return Err(WidgetError::WrongEdit {
                    field,
                    edit: match value {
                        FieldValue::Text(_) => "input",
                        FieldValue::Tags(_) => "toggle",
                    },
                });
            }
        }
        Ok(())
    }

    /// Labels of required fields that are still empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        ENTRY_FORM
            .iter()
            .filter(|spec| spec.required)
            .filter(|spec| match self.value(spec.id) {
                FieldValue::Text(text) => text.is_empty(),
                FieldValue::Tags(tags) => tags.is_empty(),
            })
            .map(|spec| spec.label)
            .collect()
    }
}
