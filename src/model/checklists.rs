const URGENT_STEPS: &[&str] = &[
    "Notify the attending physician immediately and document the time of notification.",
    "Ensure the patient remains calm and seat them comfortably. Monitor vital signs (BP, pulse, temperature).",
    "Prepare request forms for confirmatory tests: serum creatinine, GFR, urine albumin-to-creatinine ratio.",
    "Check and document current medications. NSAIDs, ACE inhibitors and metformin may need dose review.",
    "Restrict fluid intake as per physician order if oedema is present.",
    "Schedule urgent nephrology referral appointment within 24-48 hours.",
];

const MONITORING_CHECKS: &[&str] = &[
    "Record weight daily (fluid retention monitoring)",
    "Monitor urine output every 4-6 hours",
    "Blood pressure check every 2-4 hours",
    "Reassess for signs of confusion, breathlessness, or chest pain",
    "Educate patient on low-sodium, low-potassium diet",
    "Confirm patient has emergency contact details on file",
];

const ROUTINE_STEPS: &[&str] = &[
    "Inform the patient of the reassuring result and explain it does not eliminate future risk.",
    "Advise annual kidney function check if any risk factors present (diabetes, hypertension, family history).",
    "Encourage 1.5-2 L fluid intake per day and low-sodium diet.",
    "Recommend regular BP and blood glucose monitoring at home.",
    "Document result in patient file and notify attending physician.",
    "Provide patient education leaflet on CKD prevention.",
];

pub fn urgent_steps() -> &'static [&'static str] {
    URGENT_STEPS
}

pub fn monitoring_checks() -> &'static [&'static str] {
    MONITORING_CHECKS
}

pub fn routine_steps() -> &'static [&'static str] {
    ROUTINE_STEPS
}

/// Threshold marker raised on the nursing checklist of a CKD-positive verdict.
#[derive(Debug, Clone, Copy)]
pub enum MarkerRule {
    Above(f64),
    Below(f64),
    Equals(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerDef {
    pub code: &'static str,
    pub rule: MarkerRule,
    pub message: &'static str,
}

const MARKERS: &[MarkerDef] = &[
    MarkerDef {
        code: "sc",
        rule: MarkerRule::Above(2.0),
        message: "Serum Creatinine elevated (normal <= 1.2 mg/dl)",
    },
    MarkerDef {
        code: "bu",
        rule: MarkerRule::Above(50.0),
        message: "Blood Urea elevated (normal <= 40 mg/dl)",
    },
    MarkerDef {
        code: "hemo",
        rule: MarkerRule::Below(9.0),
        message: "Haemoglobin low, possible renal anaemia",
    },
    MarkerDef {
        code: "htn",
        rule: MarkerRule::Equals(1.0),
        message: "Hypertension present, strict BP monitoring required",
    },
    MarkerDef {
        code: "pe",
        rule: MarkerRule::Equals(1.0),
        message: "Pedal oedema noted, record and report fluid balance",
    },
];

pub fn marker_defs() -> &'static [MarkerDef] {
    MARKERS
}

impl MarkerRule {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            MarkerRule::Above(t) => value > t,
            MarkerRule::Below(t) => value < t,
            MarkerRule::Equals(t) => (value - t).abs() < 1e-9,
        }
    }
}
