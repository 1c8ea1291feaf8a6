//! CKD risk engine: nine-model consensus, CKD-EPI 2021 staging, attribution
//! summaries and role-tiered disclosure.

pub mod input;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod tracing;

pub use input::{AssessmentRequest, ClinicalInput, Identity, PatientContext, RawValue, Sex};
pub use model::Attribution;
pub use model::ids::ModelId;
pub use model::roles::{Capability, CapabilitySet, CaregiverRole};
pub use model::thresholds::EngineProfile;
pub use pipeline::stage6_disclose::{DisclosedAssessment, Section, classify_caregiver, disclose};
pub use pipeline::{AssessmentContext, AssessmentError, assess, request_explanation};

#[cfg(test)]
#[path = "../tests/src_inline/fixtures.rs"]
pub(crate) mod fixtures;
