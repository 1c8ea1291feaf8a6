use thiserror::Error;

use crate::model::verdict::{EnsembleVerdict, Label, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no usable model results ({failed} models failed); verdict withheld")]
pub struct InsufficientModelsError {
    pub failed: usize,
}

/// Majority vote over successful models. An even split resolves to `Ckd` so the
/// case is flagged for clinical review rather than cleared.
///
/// Confidence is the mean over agreeing models that report one; when none do,
/// it falls back to the agreeing vote share.
pub fn resolve_consensus(
    results: &[ModelResult],
    failed: usize,
) -> Result<EnsembleVerdict, InsufficientModelsError> {
    if results.is_empty() {
        return Err(InsufficientModelsError { failed });
    }

    let ckd = results
        .iter()
        .filter(|r| r.prediction == Label::Ckd)
        .count();
    let no_ckd = results.len() - ckd;
    let majority = if ckd >= no_ckd { Label::Ckd } else { Label::NoCkd };

    let agreeing = results
        .iter()
        .filter(|r| r.prediction == majority)
        .collect::<Vec<_>>();
    let reported = agreeing
        .iter()
        .filter_map(|r| r.confidence)
        .collect::<Vec<_>>();
    let confidence = if reported.is_empty() {
        agreeing.len() as f64 / results.len() as f64
    } else {
        reported.iter().sum::<f64>() / reported.len() as f64
    };

    tracing::debug!(
        "consensus: ckd={ckd}, no_ckd={no_ckd}, majority={}, confidence={confidence:.4}",
        majority.display()
    );

    Ok(EnsembleVerdict::new(
        majority,
        confidence,
        agreeing.len(),
        results.len(),
    ))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_consensus.rs"]
mod tests;
