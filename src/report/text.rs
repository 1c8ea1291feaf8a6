use crate::pipeline::stage5_explain::{ExplanationSummary, NetDirection};
use crate::pipeline::stage6_disclose::{DisclosedAssessment, NursingChecklist, Section};
use crate::report::{format_pct_1, format_pct_2, format_signed_4};

pub fn render_report_text(d: &DisclosedAssessment) -> String {
    let mut out = String::new();

    out.push_str("CKD Risk Assessment Report\n");
    out.push_str("==========================\n\n");
    out.push_str(&format!("Patient: {}\n", d.patient_id));
    match d.caregiver {
        Some(role) => out.push_str(&format!("Viewer role: {:?}\n", role)),
        None => out.push_str("Viewer role: unauthorized\n"),
    }
    out.push('\n');

    for notice in &d.notices {
        out.push_str(&format!("NOTICE: {}\n\n", notice));
    }

    if let Some(v) = &d.verdict {
        out.push_str("1. Ensemble verdict\n");
        out.push_str(&format!(
            "Result: {} (confidence {}, {}/{} models agree)\n",
            v.result_text,
            format_pct_2(v.confidence_pct),
            v.models_agree,
            v.models_used
        ));
        out.push_str(&format!("{}\n\n", v.advice));
    }

    if let Some(s) = &d.stage {
        out.push_str("2. Kidney function stage\n");
        match s.egfr {
            Some(egfr) => out.push_str(&format!("eGFR: {:.1} mL/min/1.73m2\n", egfr)),
            None => out.push_str("eGFR: unavailable\n"),
        }
        out.push_str(&format!("Stage: {}\n", s.label));
        if let Some(reason) = s.undefined_reason {
            out.push_str(&format!("Reason: {}\n", reason.message()));
        }
        out.push_str(&format!("Recommendation: {}\n\n", s.recommendation));
    }

    if let Section::Visible(b) = &d.model_breakdown {
        out.push_str("3. Individual model results\n");
        for r in &b.results {
            out.push_str(&format!(
                "{:<22} {:<7} {}\n",
                r.model.display_name(),
                r.prediction.display(),
                r.confidence
                    .map(|c| format_pct_2(c * 100.0))
                    .unwrap_or_else(|| "n/a".to_string())
            ));
        }
        for f in &b.failures {
            out.push_str(&format!(
                "{:<22} unavailable ({})\n",
                f.model.display_name(),
                f.reason
            ));
        }
        out.push('\n');
    }

    match &d.explanation {
        Section::Visible(e) => render_explanation(&mut out, e),
        Section::Unavailable { reason } => {
            out.push_str("4. Explanation\n");
            out.push_str(&format!("Explanation unavailable: {}\n\n", reason));
        }
        Section::NotRequested | Section::Restricted { .. } => {}
    }

    if let Some(c) = &d.nursing_checklist {
        render_checklist(&mut out, c);
    }

    out
}

fn render_explanation(out: &mut String, e: &ExplanationSummary) {
    out.push_str(&format!(
        "4. Explanation ({} model, {} features)\n",
        e.model.display_name(),
        e.feature_count
    ));
    out.push_str("Feature impact:\n");
    for c in &e.impact {
        out.push_str(&format!("  {:<26} {}\n", c.label, format_signed_4(c.value)));
    }
    out.push_str(&format!(
        "Risk weight: {:.4}  Protective weight: {:.4}  Risk share: {}\n",
        e.risk_weight,
        e.protective_weight,
        format_pct_1(e.risk_share_pct)
    ));
    if !e.top_risk.is_empty() {
        out.push_str("Top risk drivers:\n");
        for item in &e.top_risk {
            let norm = item
                .normal_range
                .map(|r| format!(" (Normal: {})", r))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {}{} {}\n",
                item.label,
                norm,
                format_signed_4(item.value)
            ));
        }
    }
    if !e.top_protective.is_empty() {
        out.push_str("Top protective factors:\n");
        for item in &e.top_protective {
            out.push_str(&format!(
                "  {} {}\n",
                item.label,
                format_signed_4(item.value)
            ));
        }
    }
    if !e.deviations.is_empty() {
        out.push_str("Deviation from normal-range midpoint:\n");
        for dev in &e.deviations {
            out.push_str(&format!(
                "  {:<20} {:>10} {:>8} ({:?}, normal {})\n",
                dev.label,
                dev.value,
                format_pct_1(dev.deviation_pct),
                dev.status,
                dev.normal_range
            ));
        }
    }
    let verdict_text = match e.net_direction {
        NetDirection::Risk => "net CKD risk",
        NetDirection::Protective => "net protective effect",
    };
    out.push_str(&format!(
        "Net SHAP score: {} ({})\n\n",
        format_signed_4(e.net),
        verdict_text
    ));
}

fn render_checklist(out: &mut String, c: &NursingChecklist) {
    out.push_str("5. Nursing actions\n");
    for (i, step) in c.steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    for check in &c.checks {
        out.push_str(&format!("  [ ] {}\n", check));
    }
    for m in &c.markers {
        out.push_str(&format!("  ! {}: {}\n", m.message, m.value));
    }
    out.push('\n');
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
