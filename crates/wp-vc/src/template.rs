//! # Credential Templates
//!
//! A [`CredentialTemplate`] names a credential type and declares the claims
//! it expects. Templates are never signed; they only gate what goes into a
//! payload before [`issue_with_template`](crate::issue_with_template) signs
//! it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use wp_core::Did;

/// Claim validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A required field is absent, null, or blank.
    #[error("missing required field: {0}")]
    MissingRequired(String),

    /// The value does not match the declared field type.
    #[error("field {field} must be {expected}")]
    WrongType {
        /// Field id.
        field: String,
        /// Declared type.
        expected: FieldType,
    },

    /// The value is not among the field's allowed values.
    #[error("field {field} does not allow {value:?}")]
    NotAllowed {
        /// Field id.
        field: String,
        /// Offending value.
        value: String,
    },

    /// The claim is not declared by the template.
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Declared type of a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text.
    #[serde(alias = "text")]
    String,
    /// JSON number, or a string that parses as one.
    Number,
    /// JSON boolean.
    Boolean,
    /// `YYYY-MM-DD` or RFC 3339.
    Date,
    /// `local@domain.tld`.
    Email,
    /// One of `allowed`.
    Select,
    /// A DID.
    Did,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Email => "email",
            Self::Select => "select",
            Self::Did => "did",
        };
        f.write_str(s)
    }
}

/// One declared claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Claim key in `credentialSubject`.
    pub id: String,
    /// Value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the claim must be present and non-blank.
    #[serde(default)]
    pub required: bool,
    /// Permitted values. Mandatory in practice for `select`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named credential type and its claim schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialTemplate {
    /// Stable template key (`studentCard`).
    pub key: String,
    /// Credential type appended after `VerifiableCredential`.
    pub vc_type: String,
    /// Declared claims.
    pub fields: Vec<TemplateField>,
}

impl TemplateField {
    fn new(id: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            id: id.to_string(),
            field_type,
            required,
            allowed: None,
            label: None,
        }
    }

    fn with_allowed(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    fn check(&self, value: &Value) -> Result<(), TemplateError> {
        let wrong = || TemplateError::WrongType {
            field: self.id.clone(),
            expected: self.field_type,
        };
        match (self.field_type, value) {
            (FieldType::Number, Value::Number(_)) => {}
            (FieldType::Number, Value::String(s)) if is_finite_number(s) => {}
            (FieldType::Boolean, Value::Bool(_)) => {}
            (FieldType::Date, Value::String(s)) if is_date(s) => {}
            (FieldType::Email, Value::String(s)) if is_email(s) => {}
            (FieldType::Did, Value::String(s)) if Did::parse(s).is_ok() => {}
            (FieldType::String | FieldType::Select, Value::String(_)) => {}
            _ => return Err(wrong()),
        }

        if let (Some(allowed), Value::String(s)) = (&self.allowed, value) {
            if !allowed.iter().any(|a| a == s) {
                return Err(TemplateError::NotAllowed {
                    field: self.id.clone(),
                    value: s.clone(),
                });
            }
        }
        Ok(())
    }
}

impl CredentialTemplate {
    /// Look up a field by id.
    pub fn field(&self, id: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Check `claims` against this template.
    ///
    /// Absent or null optional fields are fine. Blank strings count as
    /// absent for required fields.
    pub fn validate(&self, claims: &Map<String, Value>) -> Result<(), TemplateError> {
        if let Some(unknown) = claims.keys().find(|k| self.field(k).is_none()) {
            return Err(TemplateError::UnknownField(unknown.clone()));
        }

        for field in &self.fields {
            match claims.get(&field.id) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(TemplateError::MissingRequired(field.id.clone()));
                    }
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    if field.required {
                        return Err(TemplateError::MissingRequired(field.id.clone()));
                    }
                }
                Some(v) => field.check(v)?,
            }
        }
        Ok(())
    }

    /// Built-in issuer presets.
    pub fn presets() -> Vec<Self> {
        vec![
            Self {
                key: "studentCard".into(),
                vc_type: "StudentCard".into(),
                fields: vec![
                    TemplateField::new("name", FieldType::String, true),
                    TemplateField::new("dept", FieldType::String, false),
                    TemplateField::new("studentNo", FieldType::String, false),
                ],
            },
            Self {
                key: "employmentAttestation".into(),
                vc_type: "EmploymentAttestation".into(),
                fields: vec![
                    TemplateField::new("name", FieldType::String, true),
                    TemplateField::new("role", FieldType::String, true),
                    TemplateField::new("startDate", FieldType::Date, true),
                    TemplateField::new("status", FieldType::Select, true)
                        .with_allowed(&["active", "contractor", "terminated"]),
                ],
            },
            Self {
                key: "kycBasic".into(),
                vc_type: "KYCBasic".into(),
                fields: vec![
                    TemplateField::new("name", FieldType::String, true),
                    TemplateField::new("nationality", FieldType::String, false),
                    TemplateField::new("birthDate", FieldType::Date, false),
                    TemplateField::new("idNumber", FieldType::String, false),
                    TemplateField::new("pep", FieldType::Select, false).with_allowed(&["no", "yes"]),
                ],
            },
        ]
    }

    /// Find a preset by key.
    pub fn preset(key: &str) -> Option<Self> {
        Self::presets().into_iter().find(|t| t.key == key)
    }
}

fn is_finite_number(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_date(s: &str) -> bool {
    let s = s.trim();
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
