use serde::Serialize;
use thiserror::Error;

use crate::input::ClinicalInput;
use crate::input::fields::{FieldDef, FieldKind, field_defs, field_index};
use crate::model::thresholds::EngineProfile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field {field} has unrecognized value: {value:?}")]
    UnknownCategory { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::UnknownCategory { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category { token: String, code: f64 },
}

impl FeatureValue {
    /// Numeric reading: the parsed number, or the encoded category code.
    pub fn as_f64(&self) -> f64 {
        match self {
            FeatureValue::Number(v) => *v,
            FeatureValue::Category { code, .. } => *code,
        }
    }
}

/// The 24 fields in ensemble order. `None` marks an unknown value, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<Option<FeatureValue>>,
}

impl FeatureVector {
    pub fn get(&self, code: &str) -> Option<&FeatureValue> {
        field_index(code).and_then(|idx| self.values[idx].as_ref())
    }

    pub fn number(&self, code: &str) -> Option<f64> {
        self.get(code).map(FeatureValue::as_f64)
    }

    /// Encoded vector handed to the model server; imputation of `None` is its concern.
    pub fn encoded(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| v.as_ref().map(FeatureValue::as_f64))
            .collect()
    }

    pub fn unknown_fields(&self) -> Vec<&'static str> {
        field_defs()
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| v.is_none())
            .map(|(def, _)| def.code)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn normalize_features(
    input: &ClinicalInput,
    profile: &EngineProfile,
) -> Result<FeatureVector, ValidationError> {
    for key in input.fields.keys() {
        if field_index(key).is_none() {
            tracing::warn!("ignoring unrecognized clinical field {key:?}");
        }
    }

    let mut values = Vec::with_capacity(field_defs().len());
    for def in field_defs() {
        let value = match input.text(def.code) {
            Some(raw) => Some(parse_field(def, &raw)?),
            None => {
                if profile.required_fields.contains(&def.code) {
                    return Err(ValidationError::MissingField { field: def.code });
                }
                None
            }
        };
        values.push(value);
    }

    let vector = FeatureVector { values };
    let unknown = vector.unknown_fields();
    if !unknown.is_empty() {
        tracing::debug!("unknown fields passed through: {}", unknown.join(","));
    }
    Ok(vector)
}

fn parse_field(def: &FieldDef, raw: &str) -> Result<FeatureValue, ValidationError> {
    match def.kind {
        FieldKind::Numeric => {
            let parsed: f64 = raw.parse().map_err(|_| ValidationError::InvalidNumber {
                field: def.code,
                value: raw.to_string(),
            })?;
            if !parsed.is_finite() {
                return Err(ValidationError::InvalidNumber {
                    field: def.code,
                    value: raw.to_string(),
                });
            }
            Ok(FeatureValue::Number(parsed))
        }
        FieldKind::Categorical => {
            let code = def
                .vocabulary
                .and_then(|vocab| vocab.encode(raw))
                .ok_or_else(|| ValidationError::UnknownCategory {
                    field: def.code,
                    value: raw.to_string(),
                })?;
            Ok(FeatureValue::Category {
                token: raw.to_ascii_lowercase(),
                code,
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_normalize.rs"]
mod tests;
