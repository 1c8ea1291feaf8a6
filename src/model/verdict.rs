use serde::{Deserialize, Serialize};

use crate::model::ids::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Ckd,
    NoCkd,
}

impl Label {
    pub fn display(self) -> &'static str {
        match self {
            Label::Ckd => "CKD",
            Label::NoCkd => "No CKD",
        }
    }
}

/// One classifier's output for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResult {
    pub model: ModelId,
    pub prediction: Label,
    /// `None` when the classifier exposes no probability; it still votes.
    pub confidence: Option<f64>,
}

/// Per-model error marker; the model is excluded from the vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelFailure {
    pub model: ModelId,
    pub reason: String,
}

/// Majority-vote aggregate. Fields are private so only the consensus stage builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleVerdict {
    result: Label,
    confidence: f64,
    models_agree: usize,
    models_used: usize,
}

impl EnsembleVerdict {
    pub(crate) fn new(
        result: Label,
        confidence: f64,
        models_agree: usize,
        models_used: usize,
    ) -> Self {
        Self {
            result,
            confidence,
            models_agree,
            models_used,
        }
    }

    pub fn result(&self) -> Label {
        self.result
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence as a percentage rounded to 2 decimals.
    pub fn confidence_pct(&self) -> f64 {
        round_to(self.confidence * 100.0, 2)
    }

    pub fn models_agree(&self) -> usize {
        self.models_agree
    }

    pub fn models_used(&self) -> usize {
        self.models_used
    }

    pub fn is_ckd(&self) -> bool {
        self.result == Label::Ckd
    }
}

pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}
