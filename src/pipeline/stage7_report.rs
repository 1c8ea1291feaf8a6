use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::input::ClinicalInput;
use crate::model::stages::CkdStage;
use crate::model::verdict::{ModelFailure, ModelResult};
use crate::pipeline::AssessmentContext;
use crate::pipeline::stage6_disclose::DisclosedAssessment;
use crate::report::json::{render_disclosed_json, render_record_json};
use crate::report::text::render_report_text;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only history entry handed to the patient store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    pub patient_id: String,
    pub ensemble_result: &'static str,
    pub ensemble_conf: f64,
    pub ckd_detected: u8,
    pub models_agree: usize,
    pub models_used: usize,
    pub model_results: Vec<ModelResult>,
    pub model_failures: Vec<ModelFailure>,
    pub medical_params: ClinicalInput,
    pub stage: CkdStage,
    pub egfr: Option<f64>,
    pub performed_by: String,
    pub tool_version: &'static str,
}

pub fn build_record(ctx: &AssessmentContext, performed_by: &str) -> AssessmentRecord {
    AssessmentRecord {
        patient_id: ctx.patient.patient_id.clone(),
        ensemble_result: ctx.verdict.result().display(),
        ensemble_conf: ctx.verdict.confidence_pct(),
        ckd_detected: u8::from(ctx.verdict.is_ckd()),
        models_agree: ctx.verdict.models_agree(),
        models_used: ctx.verdict.models_used(),
        model_results: ctx.run.results.clone(),
        model_failures: ctx.run.failures.clone(),
        medical_params: ctx.clinical.clone(),
        stage: ctx.stage.stage,
        egfr: ctx.stage.egfr,
        performed_by: performed_by.to_string(),
        tool_version: env!("CARGO_PKG_VERSION"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub assessment_json: PathBuf,
    pub report_txt: PathBuf,
}

/// Writes the caller-facing outputs. Only the disclosed payload is rendered here.
pub fn write_reports(
    disclosed: &DisclosedAssessment,
    out_dir: &Path,
) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(out_dir)?;

    let paths = ReportPaths {
        assessment_json: out_dir.join("assessment.json"),
        report_txt: out_dir.join("report.txt"),
    };

    write_text(&paths.assessment_json, &render_disclosed_json(disclosed)?)?;
    write_text(&paths.report_txt, &render_report_text(disclosed))?;

    tracing::info!("reports written to {}", out_dir.display());
    Ok(paths)
}

/// Hands the unfiltered history entry to the patient store directory.
pub fn write_record(record: &AssessmentRecord, store_dir: &Path) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(store_dir)?;
    let path = store_dir.join("record.json");
    write_text(&path, &render_record_json(record)?)?;
    tracing::info!(
        "assessment record for {} stored at {}",
        record.patient_id,
        path.display()
    );
    Ok(path)
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        w.write_all(b"\n")?;
    }
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
