/// Form and submission models
///
/// Forms are defined by editors and submitted publicly. Each submission is
/// stored in the `submissions` collection and increments the form's counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::default_true;

/// Field descriptor within a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormField {
    /// Key under which the submitted value is stored
    #[validate(length(min = 1, message = "Field name is required"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Input type (text, email, textarea, select, ...)
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Choices for select-like fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

fn default_field_type() -> String {
    "text".to_string()
}

/// Per-form behavior switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormSettings {
    /// Whether the form accepts submissions
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub email_notification: bool,

    #[serde(default)]
    pub auto_reply: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            email_notification: false,
            auto_reply: false,
        }
    }
}

/// Form record as stored in the `forms` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub fields: Vec<FormField>,

    #[serde(default)]
    pub settings: FormSettings,

    /// Number of submissions received
    #[serde(default)]
    pub submissions: u64,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a form
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateForm {
    #[validate(length(min = 1, message = "Form name is required"))]
    pub name: String,

    #[validate(nested)]
    pub fields: Vec<FormField>,

    pub settings: Option<FormSettings>,
}

/// Input for updating a form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateForm {
    #[validate(length(min = 1, message = "Form name cannot be empty"))]
    pub name: Option<String>,

    #[validate(nested)]
    pub fields: Option<Vec<FormField>>,

    pub settings: Option<FormSettings>,
}

/// Submission record as stored in the `submissions` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,

    pub form_id: String,

    /// Submitted values keyed by field name
    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,

    /// Client address, when known
    #[serde(default)]
    pub ip: Option<String>,
}

/// Error type for form submissions
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The form does not accept submissions
    #[error("Form is disabled")]
    Disabled,

    /// A required field is missing or empty
    #[error("Field '{0}' is required")]
    MissingField(String),
}

impl Form {
    /// Builds a new form
    pub fn new(id: String, input: CreateForm) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: input.name,
            fields: input.fields,
            settings: input.settings.unwrap_or_default(),
            submissions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an update
    ///
    /// The submission counter is not writable through updates.
    pub fn apply(&mut self, update: UpdateForm) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(fields) = update.fields {
            self.fields = fields;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        self.updated_at = Utc::now();
    }

    /// Checks that the form accepts `data`
    ///
    /// Every field marked `required` must be present and non-empty.
    pub fn check_submission(&self, data: &Map<String, Value>) -> Result<(), SubmissionError> {
        if !self.settings.enabled {
            return Err(SubmissionError::Disabled);
        }

        for field in self.fields.iter().filter(|f| f.required) {
            let present = match data.get(&field.name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };

            if !present {
                return Err(SubmissionError::MissingField(field.name.clone()));
            }
        }

        Ok(())
    }
}

impl Submission {
    /// Builds a new submission for `form_id`
    pub fn new(id: String, form_id: String, data: Map<String, Value>, ip: Option<String>) -> Self {
        Self {
            id,
            form_id,
            data,
            submitted_at: Utc::now(),
            ip,
        }
    }
}
