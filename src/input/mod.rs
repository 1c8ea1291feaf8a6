use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod fields;
pub mod recorded;

/// A raw clinical value as submitted: form text or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Trimmed text form; `None` when the value is blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Number(v) => Some(v.to_string()),
            RawValue::Text(s) => {
                let cleaned = s.replace('\t', "");
                let trimmed = cleaned.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

/// Up to 24 named clinical fields. Absent keys, JSON `null` and blank text are all "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicalInput {
    pub fields: BTreeMap<String, Option<RawValue>>,
}

impl ClinicalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: &str, value: impl Into<RawValue>) -> Self {
        self.fields.insert(code.to_string(), Some(value.into()));
        self
    }

    /// Present, non-blank text for a field.
    pub fn text(&self, code: &str) -> Option<String> {
        self.fields
            .get(code)
            .and_then(|v| v.as_ref())
            .and_then(RawValue::as_text)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "f", alias = "F", alias = "Female")]
    Female,
    #[serde(alias = "m", alias = "M", alias = "Male")]
    Male,
}

/// Patient as resolved by the patient store; the engine never queries storage itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub patient_id: String,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub display_name: String,
}

/// Session identity supplied by the login collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: String,
    pub display_name: String,
}

/// One submission as read by the CLI: patient context plus clinical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub patient: PatientContext,
    pub clinical: ClinicalInput,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub(crate) fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_request(path: &Path) -> Result<AssessmentRequest, LoadError> {
    let request: AssessmentRequest = read_json(path)?;
    if request.patient.patient_id.trim().is_empty() {
        return Err(LoadError::InvalidInput(
            "patient.patient_id is empty".to_string(),
        ));
    }
    tracing::info!(
        "loaded assessment request: patient={}, fields={}",
        request.patient.patient_id,
        request.clinical.fields.len()
    );
    Ok(request)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
