use serde::Serialize;

use crate::input::Identity;
use crate::model::checklists::{marker_defs, monitoring_checks, routine_steps, urgent_steps};
use crate::model::roles::{Capability, CapabilitySet, CaregiverRole};
use crate::model::stages::StageResult;
use crate::model::thresholds::EngineProfile;
use crate::model::verdict::{Label, ModelFailure, ModelResult};
use crate::pipeline::AssessmentContext;
use crate::pipeline::stage1_normalize::FeatureVector;
use crate::pipeline::stage5_explain::ExplanationSummary;

/// Resolves the caregiver tier once at request entry. `None` means no clinical access.
pub fn classify_caregiver(
    role: &str,
    display_name: &str,
    specialist_marker: &str,
) -> Option<CaregiverRole> {
    match role.trim().to_ascii_lowercase().as_str() {
        "admin" => Some(CaregiverRole::Admin),
        "doctor" => {
            if display_name.trim().starts_with(specialist_marker) {
                Some(CaregiverRole::Specialist)
            } else {
                Some(CaregiverRole::GeneralPractitioner)
            }
        }
        "nurse" => Some(CaregiverRole::Nurse),
        _ => None,
    }
}

pub fn classify_identity(identity: &Identity, profile: &EngineProfile) -> Option<CaregiverRole> {
    classify_caregiver(
        &identity.role,
        &identity.display_name,
        profile.specialist_marker,
    )
}

pub fn capabilities(role: Option<CaregiverRole>) -> CapabilitySet {
    match role {
        Some(CaregiverRole::Admin) => CapabilitySet::all(),
        Some(CaregiverRole::Specialist) => CapabilitySet::all().without(Capability::UserManagement),
        Some(CaregiverRole::GeneralPractitioner) => CapabilitySet::empty()
            .with(Capability::VerdictBanner)
            .with(Capability::StageCard),
        Some(CaregiverRole::Nurse) => CapabilitySet::empty()
            .with(Capability::VerdictBanner)
            .with(Capability::StageCard)
            .with(Capability::NursingChecklist),
        None => CapabilitySet::empty(),
    }
}

/// A payload section that is either shown or replaced by an explicit notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Visible(T),
    Restricted { notice: String },
    NotRequested,
    Unavailable { reason: String },
}

impl<T> Section<T> {
    pub fn is_visible(&self) -> bool {
        matches!(self, Section::Visible(_))
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Section::Restricted { .. })
    }

    pub fn visible(&self) -> Option<&T> {
        match self {
            Section::Visible(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictBanner {
    pub result: Label,
    pub result_text: &'static str,
    pub confidence_pct: f64,
    pub models_agree: usize,
    pub models_used: usize,
    pub advice: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBreakdown {
    pub results: Vec<ModelResult>,
    pub failures: Vec<ModelFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistKind {
    Urgent,
    Routine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerFlag {
    pub code: &'static str,
    pub value: f64,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NursingChecklist {
    pub kind: ChecklistKind,
    pub steps: Vec<&'static str>,
    pub checks: Vec<&'static str>,
    pub markers: Vec<MarkerFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisclosedAssessment {
    pub patient_id: String,
    pub caregiver: Option<CaregiverRole>,
    pub capabilities: CapabilitySet,
    pub verdict: Option<VerdictBanner>,
    pub stage: Option<StageResult>,
    pub model_breakdown: Section<ModelBreakdown>,
    pub explanation: Section<ExplanationSummary>,
    pub nursing_checklist: Option<NursingChecklist>,
    pub notices: Vec<String>,
}

/// Filters one assessment for one caregiver. Capabilities are derived on every call.
pub fn disclose(
    ctx: &AssessmentContext,
    caregiver: Option<CaregiverRole>,
    profile: &EngineProfile,
) -> DisclosedAssessment {
    let caps = capabilities(caregiver);
    let notice = restricted_notice(caregiver, profile);
    let mut notices = Vec::new();

    if caregiver.is_none() {
        tracing::warn!(
            "unauthorized disclosure request for patient {}",
            ctx.patient.patient_id
        );
    }
    if let Some(n) = &notice {
        notices.push(n.clone());
    }

    let verdict = caps.contains(Capability::VerdictBanner).then(|| verdict_banner(ctx));
    let stage = caps
        .contains(Capability::StageCard)
        .then(|| ctx.stage.clone());

    let model_breakdown = if caps.contains(Capability::PerModelBreakdown) {
        Section::Visible(ModelBreakdown {
            results: ctx.run.results.clone(),
            failures: ctx.run.failures.clone(),
        })
    } else {
        Section::Restricted {
            notice: notice.clone().unwrap_or_default(),
        }
    };

    let explanation = if caps.contains(Capability::ExplanationDashboard) {
        Section::NotRequested
    } else {
        Section::Restricted {
            notice: notice.clone().unwrap_or_default(),
        }
    };

    let nursing_checklist = caps
        .contains(Capability::NursingChecklist)
        .then(|| nursing_checklist(ctx.verdict.result(), &ctx.features));

    DisclosedAssessment {
        patient_id: ctx.patient.patient_id.clone(),
        caregiver,
        capabilities: caps,
        verdict,
        stage,
        model_breakdown,
        explanation,
        nursing_checklist,
        notices,
    }
}

pub fn restricted_notice(
    caregiver: Option<CaregiverRole>,
    profile: &EngineProfile,
) -> Option<String> {
    match caregiver {
        Some(CaregiverRole::Admin) | Some(CaregiverRole::Specialist) => None,
        Some(CaregiverRole::GeneralPractitioner) => Some(format!(
            "Access notice: full model-level breakdown is available only to verified physicians (name prefixed \"{}\"). Contact admin to update your profile.",
            profile.specialist_marker
        )),
        Some(CaregiverRole::Nurse) => Some(
            "Nurse view: detailed model analysis is visible to doctors and admins only. Your action checklist is included."
                .to_string(),
        ),
        None => Some("Access denied: this role has no access to clinical content.".to_string()),
    }
}

fn verdict_banner(ctx: &AssessmentContext) -> VerdictBanner {
    let verdict = &ctx.verdict;
    VerdictBanner {
        result: verdict.result(),
        result_text: verdict.result().display(),
        confidence_pct: verdict.confidence_pct(),
        models_agree: verdict.models_agree(),
        models_used: verdict.models_used(),
        advice: match verdict.result() {
            Label::Ckd => "Confirm with GFR staging and early intervention planning.",
            Label::NoCkd => "Encourage annual renal function tests if high-risk profile.",
        },
    }
}

pub fn nursing_checklist(result: Label, features: &FeatureVector) -> NursingChecklist {
    match result {
        Label::Ckd => {
            let markers = marker_defs()
                .iter()
                .filter_map(|def| {
                    let value = features.number(def.code)?;
                    def.rule.matches(value).then_some(MarkerFlag {
                        code: def.code,
                        value,
                        message: def.message,
                    })
                })
                .collect();
            NursingChecklist {
                kind: ChecklistKind::Urgent,
                steps: urgent_steps().to_vec(),
                checks: monitoring_checks().to_vec(),
                markers,
            }
        }
        Label::NoCkd => NursingChecklist {
            kind: ChecklistKind::Routine,
            steps: routine_steps().to_vec(),
            checks: Vec::new(),
            markers: Vec::new(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_disclose.rs"]
mod tests;
