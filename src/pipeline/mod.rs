pub mod stage1_normalize;
pub mod stage2_ensemble;
pub mod stage3_consensus;
pub mod stage4_staging;
pub mod stage5_explain;
pub mod stage6_disclose;
pub mod stage7_report;

use thiserror::Error;

use crate::input::{ClinicalInput, PatientContext};
use crate::model::ids::ModelId;
use crate::model::roles::{Capability, CaregiverRole};
use crate::model::stages::StageResult;
use crate::model::thresholds::EngineProfile;
use crate::model::verdict::EnsembleVerdict;
use stage1_normalize::{FeatureVector, ValidationError, normalize_features};
use stage2_ensemble::{EnsembleRun, ModelServer, run_ensemble};
use stage3_consensus::{InsufficientModelsError, resolve_consensus};
use stage4_staging::compute_stage;
use stage5_explain::{ExplanationSummary, explain_selected};
use stage6_disclose::{DisclosedAssessment, Section, capabilities, restricted_notice};

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("invalid clinical input: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InsufficientModels(#[from] InsufficientModelsError),
}

/// Everything derived for one submission, threaded explicitly through the stages.
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub patient: PatientContext,
    pub clinical: ClinicalInput,
    pub features: FeatureVector,
    pub run: EnsembleRun,
    pub verdict: EnsembleVerdict,
    pub stage: StageResult,
}

pub fn assess(
    patient: PatientContext,
    clinical: ClinicalInput,
    server: &dyn ModelServer,
    profile: &EngineProfile,
) -> Result<AssessmentContext, AssessmentError> {
    let features = normalize_features(&clinical, profile)?;
    let run = run_ensemble(&features, server);
    let verdict = resolve_consensus(&run.results, run.failures.len())?;

    let age = features.number("age").or(patient.age);
    let stage = compute_stage(features.number("sc"), age, patient.sex);

    tracing::info!(
        "assessment {}: {} ({}/{} agree, {:.2}%), stage {:?}",
        patient.patient_id,
        verdict.result().display(),
        verdict.models_agree(),
        verdict.models_used(),
        verdict.confidence_pct(),
        stage.stage
    );

    Ok(AssessmentContext {
        patient,
        clinical,
        features,
        run,
        verdict,
        stage,
    })
}

/// On-demand explanation, gated by the caregiver's capabilities.
///
/// Calls the model server again each time; the verdict in `ctx` is never touched.
pub fn request_explanation(
    ctx: &AssessmentContext,
    caregiver: Option<CaregiverRole>,
    server: &dyn ModelServer,
    requested: Option<ModelId>,
    profile: &EngineProfile,
) -> Section<ExplanationSummary> {
    if !capabilities(caregiver).contains(Capability::ExplanationDashboard) {
        return Section::Restricted {
            notice: restricted_notice(caregiver, profile).unwrap_or_default(),
        };
    }

    let reply = server.explain(&ctx.features);
    match explain_selected(&ctx.features, &reply, requested, profile) {
        Ok(summary) => Section::Visible(summary),
        Err(err) => {
            tracing::warn!("{err}");
            Section::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

impl DisclosedAssessment {
    /// Attaches an explanation result; a section the policy restricted stays restricted.
    pub fn with_explanation(mut self, explanation: Section<ExplanationSummary>) -> Self {
        if matches!(self.explanation, Section::NotRequested) {
            self.explanation = explanation;
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/assessment.rs"]
mod tests;
