use serde::Serialize;

/// KDIGO GFR category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CkdStage {
    G1,
    G2,
    G3a,
    G3b,
    G4,
    G5,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Green,
    LightGreen,
    Yellow,
    Orange,
    Red,
    DarkRed,
    Grey,
}

#[derive(Debug, Clone, Copy)]
pub struct StageInfo {
    pub stage: CkdStage,
    /// Inclusive lower eGFR bound.
    pub lower: f64,
    pub label: &'static str,
    pub recommendation: &'static str,
    pub color: Severity,
}

/// Bands from high to low; the first band whose lower bound is met wins.
const STAGE_TABLE: &[StageInfo] = &[
    StageInfo {
        stage: CkdStage::G1,
        lower: 90.0,
        label: "G1 - Normal or high",
        recommendation: "Kidney function normal. Monitor annually if risk factors are present and manage blood pressure and glucose.",
        color: Severity::Green,
    },
    StageInfo {
        stage: CkdStage::G2,
        lower: 60.0,
        label: "G2 - Mildly decreased",
        recommendation: "Mild reduction. Recheck eGFR and urine albumin within 12 months and address cardiovascular risk factors.",
        color: Severity::LightGreen,
    },
    StageInfo {
        stage: CkdStage::G3a,
        lower: 45.0,
        label: "G3a - Mildly to moderately decreased",
        recommendation: "Moderate reduction. Repeat testing every 6 months, review nephrotoxic medications and consider nephrology input.",
        color: Severity::Yellow,
    },
    StageInfo {
        stage: CkdStage::G3b,
        lower: 30.0,
        label: "G3b - Moderately to severely decreased",
        recommendation: "Refer to nephrology. Screen for anaemia, bone-mineral disorder and adjust renally cleared drug doses.",
        color: Severity::Orange,
    },
    StageInfo {
        stage: CkdStage::G4,
        lower: 15.0,
        label: "G4 - Severely decreased",
        recommendation: "Specialist care required. Begin planning for renal replacement therapy and review every 3 months.",
        color: Severity::Red,
    },
    StageInfo {
        stage: CkdStage::G5,
        lower: f64::NEG_INFINITY,
        label: "G5 - Kidney failure",
        recommendation: "Kidney failure. Urgent nephrology review for dialysis or transplant evaluation.",
        color: Severity::DarkRed,
    },
];

const UNKNOWN_INFO: StageInfo = StageInfo {
    stage: CkdStage::Unknown,
    lower: f64::NAN,
    label: "Stage unavailable",
    recommendation: "eGFR could not be estimated from the submitted values. Confirm serum creatinine, age and sex to stage kidney function.",
    color: Severity::Grey,
};

pub fn stage_table() -> &'static [StageInfo] {
    STAGE_TABLE
}

pub fn stage_for_egfr(egfr: f64) -> &'static StageInfo {
    STAGE_TABLE
        .iter()
        .find(|info| egfr >= info.lower)
        .unwrap_or(&UNKNOWN_INFO)
}

pub fn unknown_stage() -> &'static StageInfo {
    &UNKNOWN_INFO
}

/// Why staging degraded to `Unknown`. Never fatal to the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageUndefined {
    MissingCreatinine,
    NonPositiveCreatinine,
    MissingAge,
    NonPositiveAge,
    MissingSex,
}

impl StageUndefined {
    pub fn message(self) -> &'static str {
        match self {
            StageUndefined::MissingCreatinine => "serum creatinine not provided",
            StageUndefined::NonPositiveCreatinine => "serum creatinine must be positive",
            StageUndefined::MissingAge => "age not provided",
            StageUndefined::NonPositiveAge => "age must be positive",
            StageUndefined::MissingSex => "sex not recorded for patient",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    /// Displayed eGFR, rounded to one decimal.
    pub egfr: Option<f64>,
    pub stage: CkdStage,
    pub label: &'static str,
    pub recommendation: &'static str,
    pub color: Severity,
    pub undefined_reason: Option<StageUndefined>,
}
