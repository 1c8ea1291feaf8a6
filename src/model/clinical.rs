use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct ClinicalRange {
    pub code: &'static str,
    pub low: f64,
    pub high: f64,
    pub text: &'static str,
}

const CLINICAL_RANGES: &[ClinicalRange] = &[
    ClinicalRange {
        code: "hemo",
        low: 13.0,
        high: 17.0,
        text: "13–17 g/dl",
    },
    ClinicalRange {
        code: "sc",
        low: 0.6,
        high: 1.2,
        text: "0.6–1.2 mg/dl",
    },
    ClinicalRange {
        code: "bu",
        low: 7.0,
        high: 25.0,
        text: "7–25 mg/dl",
    },
    ClinicalRange {
        code: "bgr",
        low: 70.0,
        high: 140.0,
        text: "70–140 mg/dl",
    },
    ClinicalRange {
        code: "sod",
        low: 136.0,
        high: 145.0,
        text: "136–145 mEq/L",
    },
    ClinicalRange {
        code: "pot",
        low: 3.5,
        high: 5.0,
        text: "3.5–5.0 mEq/L",
    },
    ClinicalRange {
        code: "sg",
        low: 1.010,
        high: 1.025,
        text: "1.010–1.025",
    },
    ClinicalRange {
        code: "bp",
        low: 60.0,
        high: 90.0,
        text: "60–90 mm Hg",
    },
    ClinicalRange {
        code: "pcv",
        low: 36.0,
        high: 50.0,
        text: "36–50 %",
    },
];

pub fn clinical_ranges() -> &'static [ClinicalRange] {
    CLINICAL_RANGES
}

pub fn clinical_range(code: &str) -> Option<&'static ClinicalRange> {
    CLINICAL_RANGES.iter().find(|r| r.code == code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Below,
    Within,
    Above,
}

impl ClinicalRange {
    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Signed distance from the midpoint; ±100 at the range boundaries.
    pub fn deviation_pct(&self, value: f64) -> f64 {
        let half = (self.high - self.low) / 2.0;
        let half = if half > 0.0 { half } else { 1.0 };
        ((value - self.midpoint()) / half) * 100.0
    }

    pub fn status(&self, value: f64) -> RangeStatus {
        if value < self.low {
            RangeStatus::Below
        } else if value > self.high {
            RangeStatus::Above
        } else {
            RangeStatus::Within
        }
    }
}
