use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::input::{LoadError, read_json};
use crate::model::Attribution;
use crate::model::ids::{ModelId, model_order};
use crate::pipeline::stage1_normalize::FeatureVector;
use crate::pipeline::stage2_ensemble::{ExplainReply, ModelServer, PredictReply, Prediction};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedPrediction {
    Failed { error: String },
    Ok(Prediction),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedAttribution {
    Failed { error: String },
    Ok(Attribution),
}

/// Model server backed by outputs recorded from a serving run.
#[derive(Debug, Clone, Default)]
pub struct RecordedModelServer {
    predictions: PredictReply,
    attributions: Option<ExplainReply>,
}

impl RecordedModelServer {
    pub fn new(predictions: PredictReply, attributions: Option<ExplainReply>) -> Self {
        Self {
            predictions,
            attributions,
        }
    }

    pub fn load(predictions: &Path, attributions: Option<&Path>) -> Result<Self, LoadError> {
        let raw: BTreeMap<String, RecordedPrediction> = read_json(predictions)?;
        let mut preds = PredictReply::new();
        for (name, entry) in raw {
            let model = parse_model(&name)?;
            let outcome = match entry {
                RecordedPrediction::Failed { error } => Err(error),
                RecordedPrediction::Ok(p) => Ok(p),
            };
            preds.insert(model, outcome);
        }

        let attrs = match attributions {
            Some(path) => {
                let raw: BTreeMap<String, RecordedAttribution> = read_json(path)?;
                let mut out = ExplainReply::new();
                for (name, entry) in raw {
                    let model = parse_model(&name)?;
                    let outcome = match entry {
                        RecordedAttribution::Failed { error } => Err(error),
                        RecordedAttribution::Ok(map) => Ok(map),
                    };
                    out.insert(model, outcome);
                }
                Some(out)
            }
            None => None,
        };

        tracing::info!(
            "recorded model outputs: {} predictions, {} attributions",
            preds.len(),
            attrs.as_ref().map(|a| a.len()).unwrap_or(0)
        );
        Ok(Self::new(preds, attrs))
    }
}

fn parse_model(name: &str) -> Result<ModelId, LoadError> {
    ModelId::parse(name)
        .ok_or_else(|| LoadError::InvalidInput(format!("unknown model identifier {name:?}")))
}

impl ModelServer for RecordedModelServer {
    fn predict(&self, _features: &FeatureVector) -> PredictReply {
        self.predictions.clone()
    }

    fn explain(&self, _features: &FeatureVector) -> ExplainReply {
        match &self.attributions {
            Some(attrs) => attrs.clone(),
            None => model_order()
                .iter()
                .map(|&m| (m, Err("no attribution recorded".to_string())))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/recorded.rs"]
mod tests;
