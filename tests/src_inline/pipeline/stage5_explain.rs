
use super::*;
use crate::fixtures::{attribution, explain_reply, full_clinical, sample_attribution};
use crate::input::fields::field_defs;
use crate::pipeline::stage1_normalize::normalize_features;

fn features() -> FeatureVector {
    normalize_features(&full_clinical(), &EngineProfile::strict_v1()).unwrap()
}

fn all_fields_attribution() -> Attribution {
    field_defs()
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
            (def.code.to_string(), sign * (i as f64 + 1.0) * 0.01)
        })
        .collect()
}

#[test]
fn test_impact_sorted_by_magnitude_and_capped() {
    let attr = all_fields_attribution();
    let s = summarize_attribution(
        ModelId::RandomForest,
        &attr,
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap();
    assert_eq!(s.feature_count, 24);
    assert_eq!(s.impact.len(), 15);
    assert_eq!(s.impact[0].code, "ane");
    assert_eq!(s.impact[0].label, "Anaemia");
    for pair in s.impact.windows(2) {
        assert!(pair[0].value.abs() >= pair[1].value.abs());
    }
}

#[test]
fn test_equal_magnitudes_break_ties_by_code() {
    let attr = attribution(&[("sc", 0.2), ("bu", -0.2), ("hemo", 0.1)]);
    let s = summarize_attribution(
        ModelId::Xgboost,
        &attr,
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap();
    let codes = s.impact.iter().map(|c| c.code.as_str()).collect::<Vec<_>>();
    assert_eq!(codes, vec!["bu", "sc", "hemo"]);
}

#[test]
fn test_waterfall_net_sums_every_feature() {
    let attr = all_fields_attribution();
    let expected: f64 = attr.values().sum();
    let s = summarize_attribution(
        ModelId::RandomForest,
        &attr,
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap();

    assert_eq!(s.waterfall.len(), 16);
    let relative = &s.waterfall[..15];
    assert!(relative.iter().all(|step| step.kind == StepKind::Relative));
    for pair in relative.windows(2) {
        assert!(pair[0].label <= pair[1].label);
    }
    let shown: f64 = relative.iter().map(|step| step.value).sum();
    assert!((relative[14].cumulative - shown).abs() < 1e-12);

    let net = s.waterfall.last().unwrap();
    assert_eq!(net.kind, StepKind::Net);
    assert_eq!(net.label, "Net SHAP Score");
    assert_eq!(net.code, None);
    assert!((net.value - expected).abs() < 1e-12);
    assert!((s.net - expected).abs() < 1e-12);
    assert!((shown - expected).abs() > 1e-6);
}

#[test]
fn test_risk_and_protective_weights() {
    let s = summarize_attribution(
        ModelId::RandomForest,
        &sample_attribution(),
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap();

    assert!((s.risk_weight - 0.59).abs() < 1e-9);
    assert!((s.protective_weight - 0.23).abs() < 1e-9);
    assert_eq!(s.risk_share_pct, 72.0);
    assert_eq!(s.net_direction, NetDirection::Risk);

    let risk = s.top_risk.iter().map(|i| i.code.as_str()).collect::<Vec<_>>();
    assert_eq!(risk, vec!["sc", "htn", "sg", "al"]);
    assert_eq!(s.top_risk[0].normal_range, Some("0.6–1.2 mg/dl"));
    assert_eq!(s.top_risk[1].normal_range, None);

    let protective = s
        .top_protective
        .iter()
        .map(|i| i.code.as_str())
        .collect::<Vec<_>>();
    assert_eq!(protective, vec!["hemo", "pcv", "appet"]);
}

#[test]
fn test_zero_attribution_has_zero_risk_share() {
    let attr = attribution(&[("sc", 0.0), ("hemo", 0.0)]);
    let s = summarize_attribution(
        ModelId::RandomForest,
        &attr,
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap();
    assert_eq!(s.risk_share_pct, 0.0);
    assert!(s.top_risk.is_empty());
    assert!(s.top_protective.is_empty());
    assert_eq!(s.net_direction, NetDirection::Protective);
}

#[test]
fn test_clinical_deviation_from_midpoint() {
    let devs = clinical_deviations(&features(), &sample_attribution());
    assert_eq!(devs.len(), clinical_ranges().len());

    let hemo = devs.iter().find(|d| d.code == "hemo").unwrap();
    assert!((hemo.deviation_pct - 20.0).abs() < 1e-9);
    assert_eq!(hemo.status, RangeStatus::Within);
    assert_eq!(hemo.contribution, Some(-0.15));

    let sc = devs.iter().find(|d| d.code == "sc").unwrap();
    assert!((sc.deviation_pct - 100.0).abs() < 1e-9);
    assert_eq!(sc.status, RangeStatus::Within);

    let bu = devs.iter().find(|d| d.code == "bu").unwrap();
    assert_eq!(bu.status, RangeStatus::Above);
    assert!(bu.deviation_pct > 200.0);

    let sod = devs.iter().find(|d| d.code == "sod").unwrap();
    assert_eq!(sod.contribution, None);
}

#[test]
fn test_deviation_skips_unknown_values() {
    let mut input = full_clinical();
    input.fields.remove("sg");
    let v = normalize_features(&input, &EngineProfile::strict_v1()).unwrap();
    let devs = clinical_deviations(&v, &Attribution::new());
    assert!(devs.iter().all(|d| d.code != "sg"));
    assert_eq!(devs.len(), clinical_ranges().len() - 1);
}

#[test]
fn test_select_display_model_prefers_default_then_fixed_order() {
    let available = vec![ModelId::Svm, ModelId::RandomForest, ModelId::Knn];
    assert_eq!(
        select_display_model(&available, ModelId::RandomForest),
        Some(ModelId::RandomForest)
    );
    assert_eq!(
        select_display_model(&[ModelId::Knn, ModelId::Svm], ModelId::RandomForest),
        Some(ModelId::Svm)
    );
    assert_eq!(select_display_model(&[], ModelId::RandomForest), None);
}

#[test]
fn test_explain_selected_falls_back_when_default_failed() {
    let reply = explain_reply(vec![
        (ModelId::RandomForest, Err("tree explainer failed".to_string())),
        (ModelId::Catboost, Ok(sample_attribution())),
        (ModelId::DecisionTree, Ok(sample_attribution())),
    ]);
    let s = explain_selected(&features(), &reply, None, &EngineProfile::strict_v1()).unwrap();
    assert_eq!(s.model, ModelId::DecisionTree);
    assert_eq!(
        s.available_models,
        vec![ModelId::DecisionTree, ModelId::Catboost]
    );
}

#[test]
fn test_explain_selected_honours_request() {
    let reply = explain_reply(vec![
        (ModelId::RandomForest, Ok(sample_attribution())),
        (ModelId::Knn, Ok(attribution(&[("sc", 0.5)]))),
    ]);
    let s = explain_selected(
        &features(),
        &reply,
        Some(ModelId::Knn),
        &EngineProfile::strict_v1(),
    )
    .unwrap();
    assert_eq!(s.model, ModelId::Knn);
    assert_eq!(s.feature_count, 1);
}

#[test]
fn test_explicit_request_does_not_fall_back() {
    let reply = explain_reply(vec![
        (ModelId::RandomForest, Ok(sample_attribution())),
        (ModelId::Svm, Err("kernel explainer unsupported".to_string())),
    ]);
    let profile = EngineProfile::strict_v1();

    let err = explain_selected(&features(), &reply, Some(ModelId::Svm), &profile).unwrap_err();
    assert!(matches!(
        err,
        ExplanationUnavailableError::Failed {
            model: ModelId::Svm,
            ..
        }
    ));

    let err =
        explain_selected(&features(), &reply, Some(ModelId::NaiveBayes), &profile).unwrap_err();
    assert_eq!(
        err,
        ExplanationUnavailableError::NotReturned {
            model: ModelId::NaiveBayes
        }
    );
}

#[test]
fn test_no_usable_attribution() {
    let reply = explain_reply(vec![(ModelId::RandomForest, Err("timeout".to_string()))]);
    let err = explain_selected(&features(), &reply, None, &EngineProfile::strict_v1()).unwrap_err();
    assert_eq!(err, ExplanationUnavailableError::NoAttributions);
}

#[test]
fn test_non_finite_contribution_rejected() {
    let attr = attribution(&[("sc", 0.2), ("bu", f64::NAN)]);
    let err = summarize_attribution(
        ModelId::RandomForest,
        &attr,
        &features(),
        &EngineProfile::strict_v1(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ExplanationUnavailableError::InvalidContribution {
            model: ModelId::RandomForest,
            feature: "bu".to_string()
        }
    );
}
