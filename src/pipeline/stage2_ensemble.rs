use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Attribution;
use crate::model::ids::{ModelId, model_order};
use crate::model::verdict::{Label, ModelFailure, ModelResult};
use crate::pipeline::stage1_normalize::FeatureVector;

/// Raw classifier reply before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    #[serde(default)]
    pub confidence: Option<f64>,
}

pub type PredictReply = BTreeMap<ModelId, Result<Prediction, String>>;
pub type ExplainReply = BTreeMap<ModelId, Result<Attribution, String>>;

/// Model-serving collaborator. Per-model failures are reported in the map, never as a batch error.
pub trait ModelServer {
    fn predict(&self, features: &FeatureVector) -> PredictReply;
    fn explain(&self, features: &FeatureVector) -> ExplainReply;
}

/// One pre-trained, opaque classifier.
pub trait Classifier: Send + Sync {
    fn id(&self) -> ModelId;
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, String>;
    fn explain(&self, _features: &FeatureVector) -> Result<Attribution, String> {
        Err("attribution not supported by this classifier".to_string())
    }
}

/// Fans each call out to independent classifiers in parallel.
pub struct ClassifierBank {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl ClassifierBank {
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Self {
        Self { classifiers }
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl ModelServer for ClassifierBank {
    fn predict(&self, features: &FeatureVector) -> PredictReply {
        self.classifiers
            .par_iter()
            .map(|c| (c.id(), c.predict(features)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn explain(&self, features: &FeatureVector) -> ExplainReply {
        self.classifiers
            .par_iter()
            .map(|c| (c.id(), c.explain(features)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelUnavailableError {
    #[error("{model}: {reason}")]
    Reported { model: ModelId, reason: String },
    #[error("{model}: no result returned")]
    Missing { model: ModelId },
    #[error("{model}: confidence {value} outside [0, 1]")]
    ConfidenceOutOfRange { model: ModelId, value: f64 },
}

impl ModelUnavailableError {
    pub fn model(&self) -> ModelId {
        match self {
            ModelUnavailableError::Reported { model, .. }
            | ModelUnavailableError::Missing { model }
            | ModelUnavailableError::ConfidenceOutOfRange { model, .. } => *model,
        }
    }
}

impl From<ModelUnavailableError> for ModelFailure {
    fn from(err: ModelUnavailableError) -> Self {
        ModelFailure {
            model: err.model(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleRun {
    pub results: Vec<ModelResult>,
    pub failures: Vec<ModelFailure>,
}

pub fn run_ensemble(features: &FeatureVector, server: &dyn ModelServer) -> EnsembleRun {
    let mut reply = server.predict(features);

    let mut results = Vec::with_capacity(model_order().len());
    let mut failures = Vec::new();
    for &model in model_order() {
        match validate_prediction(model, reply.remove(&model)) {
            Ok(result) => results.push(result),
            Err(err) => {
                tracing::warn!("model unavailable: {err}");
                failures.push(ModelFailure::from(err));
            }
        }
    }

    tracing::info!(
        "ensemble run: {} succeeded, {} failed",
        results.len(),
        failures.len()
    );
    EnsembleRun { results, failures }
}

fn validate_prediction(
    model: ModelId,
    reply: Option<Result<Prediction, String>>,
) -> Result<ModelResult, ModelUnavailableError> {
    let prediction = match reply {
        None => return Err(ModelUnavailableError::Missing { model }),
        Some(Err(reason)) => return Err(ModelUnavailableError::Reported { model, reason }),
        Some(Ok(p)) => p,
    };
    // A label without a probability still votes; a reported probability must be valid.
    if let Some(value) = prediction.confidence {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ModelUnavailableError::ConfidenceOutOfRange { model, value });
        }
    }
    Ok(ModelResult {
        model,
        prediction: prediction.label,
        confidence: prediction.confidence,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_ensemble.rs"]
mod tests;
