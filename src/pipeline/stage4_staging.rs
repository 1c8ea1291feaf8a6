use crate::input::Sex;
use crate::model::stages::{StageInfo, StageResult, StageUndefined, stage_for_egfr, unknown_stage};
use crate::model::verdict::round_to;

/// CKD-EPI 2021 race-free eGFR (mL/min/1.73m²).
pub fn ckd_epi_2021(serum_creatinine: f64, age: f64, sex: Sex) -> f64 {
    let (kappa, alpha, sex_coeff) = match sex {
        Sex::Female => (0.7, -0.241, 1.012),
        Sex::Male => (0.9, -0.302, 1.0),
    };
    let ratio = serum_creatinine / kappa;
    142.0
        * ratio.min(1.0).powf(alpha)
        * ratio.max(1.0).powf(-1.200)
        * 0.9938f64.powf(age)
        * sex_coeff
}

/// Stage is decided on the unrounded eGFR; only the displayed figure is rounded.
pub fn compute_stage(
    serum_creatinine: Option<f64>,
    age: Option<f64>,
    sex: Option<Sex>,
) -> StageResult {
    let inputs = check_inputs(serum_creatinine, age, sex);
    let (sc, age, sex) = match inputs {
        Ok(v) => v,
        Err(reason) => {
            tracing::info!("staging unavailable: {}", reason.message());
            return build_result(None, unknown_stage(), Some(reason));
        }
    };

    let egfr = ckd_epi_2021(sc, age, sex);
    let info = stage_for_egfr(egfr);
    build_result(Some(round_to(egfr, 1)), info, None)
}

fn check_inputs(
    serum_creatinine: Option<f64>,
    age: Option<f64>,
    sex: Option<Sex>,
) -> Result<(f64, f64, Sex), StageUndefined> {
    let sc = serum_creatinine.ok_or(StageUndefined::MissingCreatinine)?;
    if sc.is_nan() || sc <= 0.0 {
        return Err(StageUndefined::NonPositiveCreatinine);
    }
    let age = age.ok_or(StageUndefined::MissingAge)?;
    if age.is_nan() || age <= 0.0 {
        return Err(StageUndefined::NonPositiveAge);
    }
    let sex = sex.ok_or(StageUndefined::MissingSex)?;
    Ok((sc, age, sex))
}

fn build_result(
    egfr: Option<f64>,
    info: &'static StageInfo,
    undefined_reason: Option<StageUndefined>,
) -> StageResult {
    StageResult {
        egfr,
        stage: info.stage,
        label: info.label,
        recommendation: info.recommendation,
        color: info.color,
        undefined_reason,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_staging.rs"]
mod tests;
