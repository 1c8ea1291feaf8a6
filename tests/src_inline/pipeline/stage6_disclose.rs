
use super::*;
use crate::fixtures::{context, full_clinical};
use crate::model::roles::capability_order;
use crate::pipeline::stage1_normalize::normalize_features;

fn profile() -> EngineProfile {
    EngineProfile::strict_v1()
}

#[test]
fn test_classify_caregiver_roles() {
    assert_eq!(classify_caregiver("admin", "", "Dr."), Some(CaregiverRole::Admin));
    assert_eq!(
        classify_caregiver("doctor", "Dr. Okafor", "Dr."),
        Some(CaregiverRole::Specialist)
    );
    assert_eq!(
        classify_caregiver(" Doctor ", "  Dr. Lee", "Dr."),
        Some(CaregiverRole::Specialist)
    );
    assert_eq!(
        classify_caregiver("doctor", "Okafor", "Dr."),
        Some(CaregiverRole::GeneralPractitioner)
    );
    assert_eq!(
        classify_caregiver("doctor", "dr. Okafor", "Dr."),
        Some(CaregiverRole::GeneralPractitioner)
    );
    assert_eq!(classify_caregiver("NURSE", "Sam", "Dr."), Some(CaregiverRole::Nurse));
    assert_eq!(classify_caregiver("receptionist", "Dr. Who", "Dr."), None);
    assert_eq!(classify_caregiver("", "", "Dr."), None);
}

#[test]
fn test_classify_identity_uses_profile_marker() {
    let identity = Identity {
        username: "akim".to_string(),
        role: "doctor".to_string(),
        display_name: "Dr. Akim".to_string(),
    };
    assert_eq!(
        classify_identity(&identity, &profile()),
        Some(CaregiverRole::Specialist)
    );
}

#[test]
fn test_capability_matrix() {
    let admin = capabilities(Some(CaregiverRole::Admin));
    assert_eq!(admin.to_vec(), capability_order().to_vec());

    let specialist = capabilities(Some(CaregiverRole::Specialist));
    assert!(specialist.contains(Capability::PerModelBreakdown));
    assert!(specialist.contains(Capability::ExplanationDashboard));
    assert!(!specialist.contains(Capability::UserManagement));

    let gp = capabilities(Some(CaregiverRole::GeneralPractitioner));
    assert_eq!(
        gp.to_vec(),
        vec![Capability::VerdictBanner, Capability::StageCard]
    );

    let nurse = capabilities(Some(CaregiverRole::Nurse));
    assert!(nurse.contains(Capability::NursingChecklist));
    assert!(!nurse.contains(Capability::PerModelBreakdown));
    assert!(!nurse.contains(Capability::ExplanationDashboard));

    assert!(capabilities(None).is_empty());
}

#[test]
fn test_specialist_sees_everything_but_checklist() {
    let ctx = context(7);
    let d = disclose(&ctx, Some(CaregiverRole::Specialist), &profile());
    assert!(d.notices.is_empty());
    let banner = d.verdict.as_ref().unwrap();
    assert_eq!(banner.result, Label::Ckd);
    assert_eq!(banner.result_text, "CKD");
    assert_eq!(banner.models_agree, 7);
    assert_eq!(banner.models_used, 9);
    assert!(d.stage.is_some());
    let breakdown = d.model_breakdown.visible().unwrap();
    assert_eq!(breakdown.results.len(), 9);
    assert_eq!(d.explanation, Section::NotRequested);
    assert!(d.nursing_checklist.is_none());
}

#[test]
fn test_general_practitioner_gets_verdict_and_notice() {
    let ctx = context(2);
    let d = disclose(&ctx, Some(CaregiverRole::GeneralPractitioner), &profile());
    assert_eq!(d.verdict.as_ref().unwrap().result, Label::NoCkd);
    assert!(d.stage.is_some());
    assert!(d.model_breakdown.is_restricted());
    assert!(d.explanation.is_restricted());
    assert!(d.nursing_checklist.is_none());
    assert_eq!(d.notices.len(), 1);
    assert!(d.notices[0].contains("\"Dr.\""));
    match &d.model_breakdown {
        Section::Restricted { notice } => assert_eq!(notice, &d.notices[0]),
        other => panic!("expected restricted breakdown, got {other:?}"),
    }
}

#[test]
fn test_nurse_gets_checklist() {
    let ctx = context(9);
    let d = disclose(&ctx, Some(CaregiverRole::Nurse), &profile());
    assert!(d.verdict.is_some());
    assert!(d.model_breakdown.is_restricted());
    assert!(d.explanation.is_restricted());
    assert!(d.notices[0].starts_with("Nurse view:"));
    let checklist = d.nursing_checklist.as_ref().unwrap();
    assert_eq!(checklist.kind, ChecklistKind::Urgent);
}

#[test]
fn test_admin_sees_all_sections() {
    let ctx = context(4);
    let d = disclose(&ctx, Some(CaregiverRole::Admin), &profile());
    assert!(d.notices.is_empty());
    assert!(d.model_breakdown.is_visible());
    assert_eq!(d.explanation, Section::NotRequested);
    assert_eq!(
        d.nursing_checklist.as_ref().unwrap().kind,
        ChecklistKind::Routine
    );
    assert!(d.capabilities.contains(Capability::UserManagement));
}

#[test]
fn test_unauthorized_role_sees_nothing() {
    let ctx = context(9);
    let d = disclose(&ctx, None, &profile());
    assert!(d.verdict.is_none());
    assert!(d.stage.is_none());
    assert!(d.model_breakdown.is_restricted());
    assert!(d.explanation.is_restricted());
    assert!(d.nursing_checklist.is_none());
    assert!(d.capabilities.is_empty());
    assert!(d.notices[0].starts_with("Access denied"));
}

#[test]
fn test_disclosure_is_a_pure_function() {
    let ctx = context(6);
    let a = disclose(&ctx, Some(CaregiverRole::GeneralPractitioner), &profile());
    let b = disclose(&ctx, Some(CaregiverRole::GeneralPractitioner), &profile());
    assert_eq!(a, b);
    let specialist = disclose(&ctx, Some(CaregiverRole::Specialist), &profile());
    assert_eq!(a.verdict, specialist.verdict);
}

#[test]
fn test_urgent_checklist_markers() {
    let input = full_clinical()
        .with("sc", 3.4)
        .with("bu", 88.0)
        .with("hemo", 8.1)
        .with("htn", "yes")
        .with("pe", "yes");
    let v = normalize_features(&input, &profile()).unwrap();
    let c = nursing_checklist(Label::Ckd, &v);
    assert_eq!(c.steps.len(), 6);
    assert_eq!(c.checks.len(), 6);
    let codes = c.markers.iter().map(|m| m.code).collect::<Vec<_>>();
    assert_eq!(codes, vec!["sc", "bu", "hemo", "htn", "pe"]);
    assert_eq!(c.markers[0].value, 3.4);
}

#[test]
fn test_urgent_checklist_without_markers() {
    let input = full_clinical().with("htn", "no");
    let v = normalize_features(&input, &profile()).unwrap();
    let c = nursing_checklist(Label::Ckd, &v);
    assert!(c.markers.is_empty());
}

#[test]
fn test_routine_checklist() {
    let v = normalize_features(&full_clinical(), &profile()).unwrap();
    let c = nursing_checklist(Label::NoCkd, &v);
    assert_eq!(c.kind, ChecklistKind::Routine);
    assert_eq!(c.steps.len(), 6);
    assert!(c.checks.is_empty());
    assert!(c.markers.is_empty());
}

#[test]
fn test_section_serializes_with_status_tag() {
    let visible: Section<u32> = Section::Visible(3);
    let restricted: Section<u32> = Section::Restricted {
        notice: "no".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&visible).unwrap(),
        serde_json::json!({"status": "visible", "data": 3})
    );
    assert_eq!(
        serde_json::to_value(&restricted).unwrap(),
        serde_json::json!({"status": "restricted", "data": {"notice": "no"}})
    );
    assert_eq!(
        serde_json::to_value(Section::<u32>::NotRequested).unwrap(),
        serde_json::json!({"status": "not_requested"})
    );
}
