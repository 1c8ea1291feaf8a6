
use super::*;
use crate::fixtures::{
    CountingServer, context_with, explain_reply, full_clinical, patient, sample_attribution, votes,
};
use crate::input::Sex;
use crate::input::recorded::RecordedModelServer;
use crate::model::stages::{CkdStage, StageUndefined};
use crate::model::verdict::Label;
use crate::pipeline::stage2_ensemble::PredictReply;

fn explaining_server() -> CountingServer {
    CountingServer::new(
        votes(6),
        explain_reply(vec![
            (ModelId::RandomForest, Ok(sample_attribution())),
            (ModelId::Svm, Ok(sample_attribution())),
            (ModelId::Knn, Err("explainer crashed".to_string())),
        ]),
    )
}

#[test]
fn test_assess_end_to_end() {
    let server = RecordedModelServer::new(votes(6), None);
    let ctx = context_with(&server, Some(Sex::Male));
    assert_eq!(ctx.verdict.result(), Label::Ckd);
    assert_eq!(ctx.verdict.models_agree(), 6);
    assert_eq!(ctx.verdict.models_used(), 9);
    assert_eq!(ctx.run.results.len(), 9);
    assert!(ctx.stage.egfr.is_some());
    assert_ne!(ctx.stage.stage, CkdStage::Unknown);
}

#[test]
fn test_assess_counts_label_only_votes() {
    let mut reply = votes(4);
    for (_, outcome) in reply.iter_mut() {
        if let Ok(p) = outcome {
            if p.label == Label::NoCkd {
                p.confidence = None;
            }
        }
    }
    let server = RecordedModelServer::new(reply, None);
    let ctx = context_with(&server, Some(Sex::Female));
    assert!(ctx.run.failures.is_empty());
    assert_eq!(ctx.verdict.result(), Label::NoCkd);
    assert_eq!(ctx.verdict.models_agree(), 5);
    assert_eq!(ctx.verdict.models_used(), 9);
    assert_eq!(ctx.verdict.confidence_pct(), 55.56);
}

#[test]
fn test_assess_without_sex_keeps_verdict() {
    let server = RecordedModelServer::new(votes(3), None);
    let ctx = context_with(&server, None);
    assert_eq!(ctx.verdict.result(), Label::NoCkd);
    assert_eq!(ctx.stage.stage, CkdStage::Unknown);
    assert_eq!(ctx.stage.undefined_reason, Some(StageUndefined::MissingSex));
}

#[test]
fn test_assess_prefers_clinical_age_over_patient_age() {
    let server = RecordedModelServer::new(votes(9), None);
    let mut p = patient(Some(Sex::Female));
    p.age = Some(90.0);
    let clinical = full_clinical().with("sc", 1.0).with("age", 40.0);
    let ctx = assess(p, clinical, &server, &EngineProfile::strict_v1()).unwrap();
    assert_eq!(ctx.stage.egfr, Some(73.0));
    assert_eq!(ctx.stage.stage, CkdStage::G2);
}

#[test]
fn test_assess_lenient_falls_back_to_patient_age() {
    let server = RecordedModelServer::new(votes(9), None);
    let clinical = ClinicalInput::new().with("sc", 1.0);
    let mut p = patient(Some(Sex::Female));
    p.age = Some(40.0);
    let ctx = assess(p, clinical, &server, &EngineProfile::lenient_v1()).unwrap();
    assert_eq!(ctx.stage.stage, CkdStage::G2);
}

#[test]
fn test_assess_rejects_invalid_input() {
    let server = RecordedModelServer::new(votes(9), None);
    let clinical = full_clinical().with("sc", "high");
    let err = assess(
        patient(Some(Sex::Male)),
        clinical,
        &server,
        &EngineProfile::strict_v1(),
    )
    .unwrap_err();
    assert!(matches!(err, AssessmentError::Validation(_)));
}

#[test]
fn test_assess_all_models_failed() {
    let server = RecordedModelServer::new(PredictReply::new(), None);
    let err = assess(
        patient(Some(Sex::Male)),
        full_clinical(),
        &server,
        &EngineProfile::strict_v1(),
    )
    .unwrap_err();
    match err {
        AssessmentError::InsufficientModels(e) => assert_eq!(e.failed, 9),
        other => panic!("expected insufficient models, got {other:?}"),
    }
}

#[test]
fn test_request_explanation_for_specialist() {
    let server = explaining_server();
    let ctx = context_with(&server, Some(Sex::Female));
    let verdict = ctx.verdict.clone();

    let section = request_explanation(
        &ctx,
        Some(CaregiverRole::Specialist),
        &server,
        None,
        &EngineProfile::strict_v1(),
    );
    let summary = section.visible().unwrap();
    assert_eq!(summary.model, ModelId::RandomForest);
    assert_eq!(
        summary.available_models,
        vec![ModelId::Svm, ModelId::RandomForest]
    );
    assert_eq!(server.explain_calls.get(), 1);
    assert_eq!(ctx.verdict, verdict);
}

#[test]
fn test_request_explanation_recomputes_each_time() {
    let server = explaining_server();
    let ctx = context_with(&server, Some(Sex::Female));
    let profile = EngineProfile::strict_v1();

    let first = request_explanation(&ctx, Some(CaregiverRole::Admin), &server, None, &profile);
    let second = request_explanation(&ctx, Some(CaregiverRole::Admin), &server, None, &profile);
    assert_eq!(first, second);
    assert_eq!(server.explain_calls.get(), 2);
}

#[test]
fn test_request_explanation_restricted_for_gp_without_calling_server() {
    let server = explaining_server();
    let ctx = context_with(&server, Some(Sex::Female));

    let section = request_explanation(
        &ctx,
        Some(CaregiverRole::GeneralPractitioner),
        &server,
        None,
        &EngineProfile::strict_v1(),
    );
    assert!(section.is_restricted());
    assert_eq!(server.explain_calls.get(), 0);

    let denied = request_explanation(&ctx, None, &server, None, &EngineProfile::strict_v1());
    match denied {
        Section::Restricted { notice } => assert!(notice.starts_with("Access denied")),
        other => panic!("expected restricted, got {other:?}"),
    }
}

#[test]
fn test_request_explanation_for_failed_model_is_unavailable() {
    let server = explaining_server();
    let ctx = context_with(&server, Some(Sex::Female));

    let section = request_explanation(
        &ctx,
        Some(CaregiverRole::Specialist),
        &server,
        Some(ModelId::Knn),
        &EngineProfile::strict_v1(),
    );
    match section {
        Section::Unavailable { reason } => assert!(reason.contains("explainer crashed")),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[test]
fn test_with_explanation_keeps_restriction() {
    let server = explaining_server();
    let ctx = context_with(&server, Some(Sex::Female));
    let profile = EngineProfile::strict_v1();

    let specialist = stage6_disclose::disclose(&ctx, Some(CaregiverRole::Specialist), &profile);
    let explanation = request_explanation(
        &ctx,
        Some(CaregiverRole::Specialist),
        &server,
        None,
        &profile,
    );
    let shown = specialist.with_explanation(explanation.clone());
    assert!(shown.explanation.is_visible());

    let gp = stage6_disclose::disclose(&ctx, Some(CaregiverRole::GeneralPractitioner), &profile);
    let still_restricted = gp.with_explanation(explanation);
    assert!(still_restricted.explanation.is_restricted());
}
