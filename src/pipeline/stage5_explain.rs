use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::input::fields::feature_label;
use crate::model::Attribution;
use crate::model::clinical::{RangeStatus, clinical_range, clinical_ranges};
use crate::model::ids::{ModelId, model_order};
use crate::model::thresholds::EngineProfile;
use crate::model::verdict::round_to;
use crate::pipeline::stage1_normalize::FeatureVector;
use crate::pipeline::stage2_ensemble::ExplainReply;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplanationUnavailableError {
    #[error("explanation failed for {model}: {reason}")]
    Failed { model: ModelId, reason: String },
    #[error("no attribution returned for {model}")]
    NotReturned { model: ModelId },
    #[error("attribution for {model} has a non-finite value for {feature}")]
    InvalidContribution { model: ModelId, feature: String },
    #[error("no model returned a usable attribution")]
    NoAttributions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub code: String,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Relative,
    Net,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallStep {
    pub label: String,
    pub code: Option<String>,
    pub value: f64,
    pub cumulative: f64,
    pub kind: StepKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeItem {
    pub code: String,
    pub label: String,
    pub value: f64,
    pub normal_range: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalDeviation {
    pub code: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub normal_range: &'static str,
    pub deviation_pct: f64,
    pub status: RangeStatus,
    pub contribution: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetDirection {
    Risk,
    Protective,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationSummary {
    pub model: ModelId,
    pub feature_count: usize,
    pub impact: Vec<FeatureContribution>,
    pub waterfall: Vec<WaterfallStep>,
    /// Sum over every attributed feature, not only the displayed ones.
    pub net: f64,
    pub net_direction: NetDirection,
    pub risk_weight: f64,
    pub protective_weight: f64,
    pub risk_share_pct: f64,
    pub top_risk: Vec<NarrativeItem>,
    pub top_protective: Vec<NarrativeItem>,
    pub deviations: Vec<ClinicalDeviation>,
    pub available_models: Vec<ModelId>,
}

/// Picks the model to explain and summarizes its attribution.
///
/// An explicit request is honoured or fails; without one the profile default
/// is used, then the first usable model in fixed order.
pub fn explain_selected(
    features: &FeatureVector,
    reply: &ExplainReply,
    requested: Option<ModelId>,
    profile: &EngineProfile,
) -> Result<ExplanationSummary, ExplanationUnavailableError> {
    let available = usable_models(reply);
    for (model, outcome) in reply {
        if let Err(reason) = outcome {
            tracing::warn!("explanation unavailable for {model}: {reason}");
        }
    }

    let model = match requested {
        Some(model) => match reply.get(&model) {
            None => return Err(ExplanationUnavailableError::NotReturned { model }),
            Some(Err(reason)) => {
                return Err(ExplanationUnavailableError::Failed {
                    model,
                    reason: reason.clone(),
                });
            }
            Some(Ok(_)) => model,
        },
        None => select_display_model(&available, profile.default_explain_model)
            .ok_or(ExplanationUnavailableError::NoAttributions)?,
    };

    let attribution = match reply.get(&model) {
        Some(Ok(map)) => map,
        _ => return Err(ExplanationUnavailableError::NotReturned { model }),
    };

    let mut summary = summarize_attribution(model, attribution, features, profile)?;
    summary.available_models = available;
    Ok(summary)
}

pub fn usable_models(reply: &ExplainReply) -> Vec<ModelId> {
    model_order()
        .iter()
        .copied()
        .filter(|m| matches!(reply.get(m), Some(Ok(_))))
        .collect()
}

pub fn select_display_model(available: &[ModelId], preferred: ModelId) -> Option<ModelId> {
    if available.contains(&preferred) {
        return Some(preferred);
    }
    model_order()
        .iter()
        .copied()
        .find(|m| available.contains(m))
}

pub fn summarize_attribution(
    model: ModelId,
    attribution: &Attribution,
    features: &FeatureVector,
    profile: &EngineProfile,
) -> Result<ExplanationSummary, ExplanationUnavailableError> {
    let mut contributions = Vec::with_capacity(attribution.len());
    for (code, &value) in attribution {
        if !value.is_finite() {
            return Err(ExplanationUnavailableError::InvalidContribution {
                model,
                feature: code.clone(),
            });
        }
        contributions.push(FeatureContribution {
            code: code.clone(),
            label: feature_label(code).to_string(),
            value,
        });
    }

    let by_magnitude = sorted_by_magnitude(&contributions);
    let net: f64 = contributions.iter().map(|c| c.value).sum();

    let risk = by_magnitude
        .iter()
        .filter(|c| c.value > 0.0)
        .collect::<Vec<_>>();
    let protective = by_magnitude
        .iter()
        .filter(|c| c.value < 0.0)
        .collect::<Vec<_>>();
    let risk_weight: f64 = risk.iter().map(|c| c.value.abs()).sum();
    let protective_weight: f64 = protective.iter().map(|c| c.value.abs()).sum();
    let total_weight = risk_weight + protective_weight;
    let risk_share_pct = if total_weight > 0.0 {
        round_to(risk_weight / total_weight * 100.0, 1)
    } else {
        0.0
    };

    Ok(ExplanationSummary {
        model,
        feature_count: contributions.len(),
        impact: by_magnitude
            .iter()
            .take(profile.impact_top_n)
            .cloned()
            .collect(),
        waterfall: build_waterfall(&contributions, net, profile.waterfall_cap),
        net,
        net_direction: if net > 0.0 {
            NetDirection::Risk
        } else {
            NetDirection::Protective
        },
        risk_weight,
        protective_weight,
        risk_share_pct,
        top_risk: narrative(&risk, profile.narrative_risk_n),
        top_protective: narrative(&protective, profile.narrative_protective_n),
        deviations: clinical_deviations(features, attribution),
        available_models: vec![model],
    })
}

/// |value| descending; equal magnitudes fall back to code ascending.
fn sorted_by_magnitude(contributions: &[FeatureContribution]) -> Vec<FeatureContribution> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    sorted
}

fn build_waterfall(
    contributions: &[FeatureContribution],
    net: f64,
    cap: usize,
) -> Vec<WaterfallStep> {
    let mut by_label = contributions.to_vec();
    by_label.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.code.cmp(&b.code)));

    let mut steps = Vec::with_capacity(cap.min(by_label.len()) + 1);
    let mut cumulative = 0.0;
    for c in by_label.into_iter().take(cap) {
        cumulative += c.value;
        steps.push(WaterfallStep {
            label: c.label,
            code: Some(c.code),
            value: c.value,
            cumulative,
            kind: StepKind::Relative,
        });
    }
    steps.push(WaterfallStep {
        label: "Net SHAP Score".to_string(),
        code: None,
        value: net,
        cumulative: net,
        kind: StepKind::Net,
    });
    steps
}

fn narrative(items: &[&FeatureContribution], n: usize) -> Vec<NarrativeItem> {
    items
        .iter()
        .take(n)
        .map(|c| NarrativeItem {
            code: c.code.clone(),
            label: c.label.clone(),
            value: c.value,
            normal_range: clinical_range(&c.code).map(|r| r.text),
        })
        .collect()
}

/// Deviation from the normal-range midpoint for every ranged field with a known value.
pub fn clinical_deviations(
    features: &FeatureVector,
    attribution: &Attribution,
) -> Vec<ClinicalDeviation> {
    let mut out = Vec::new();
    for range in clinical_ranges() {
        let Some(value) = features.number(range.code) else {
            continue;
        };
        out.push(ClinicalDeviation {
            code: range.code,
            label: feature_label(range.code),
            value,
            normal_range: range.text,
            deviation_pct: range.deviation_pct(value),
            status: range.status(value),
            contribution: attribution.get(range.code).copied(),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_explain.rs"]
mod tests;
