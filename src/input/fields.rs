use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// Accepted values of a categorical field and their encoded number.
#[derive(Debug, Clone, Copy)]
pub enum Vocabulary {
    /// Text tokens, matched case-insensitively.
    Tokens(&'static [(&'static str, f64)]),
    /// Ordinal numeric levels; the encoded value is the level itself.
    Levels(&'static [f64]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub code: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub unit: &'static str,
    pub vocabulary: Option<Vocabulary>,
}

const NORMAL_ABNORMAL: &[(&str, f64)] = &[("normal", 1.0), ("abnormal", 0.0)];
const PRESENT_NOTPRESENT: &[(&str, f64)] = &[("present", 1.0), ("notpresent", 0.0)];
const YES_NO: &[(&str, f64)] = &[("yes", 1.0), ("no", 0.0)];
const GOOD_POOR: &[(&str, f64)] = &[("good", 1.0), ("poor", 0.0)];
const SPECIFIC_GRAVITY: &[f64] = &[1.005, 1.010, 1.015, 1.020, 1.025];
const GRADE_0_5: &[f64] = &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

const fn numeric(code: &'static str, label: &'static str, unit: &'static str) -> FieldDef {
    FieldDef {
        code,
        label,
        kind: FieldKind::Numeric,
        unit,
        vocabulary: None,
    }
}

const fn categorical(code: &'static str, label: &'static str, vocabulary: Vocabulary) -> FieldDef {
    FieldDef {
        code,
        label,
        kind: FieldKind::Categorical,
        unit: "",
        vocabulary: Some(vocabulary),
    }
}

pub const N_FIELDS: usize = 24;
pub const N_NUMERIC: usize = 11;

/// Fixed feature order consumed by the ensemble: numeric block, then categorical block.
const FIELDS: [FieldDef; N_FIELDS] = [
    numeric("age", "Age", "years"),
    numeric("bp", "Blood Pressure", "mm Hg"),
    numeric("bgr", "Blood Glucose", "mg/dl"),
    numeric("bu", "Blood Urea", "mg/dl"),
    numeric("sc", "Serum Creatinine", "mg/dl"),
    numeric("sod", "Sodium", "mEq/L"),
    numeric("pot", "Potassium", "mEq/L"),
    numeric("hemo", "Haemoglobin", "g/dl"),
    numeric("pcv", "Packed Cell Volume", "%"),
    numeric("wc", "WBC Count", "cells/cumm"),
    numeric("rc", "RBC Count", "millions/cmm"),
    categorical("sg", "Specific Gravity", Vocabulary::Levels(SPECIFIC_GRAVITY)),
    categorical("al", "Albumin", Vocabulary::Levels(GRADE_0_5)),
    categorical("su", "Sugar", Vocabulary::Levels(GRADE_0_5)),
    categorical("rbc", "RBC in Urine", Vocabulary::Tokens(NORMAL_ABNORMAL)),
    categorical("pc", "Pus Cells", Vocabulary::Tokens(NORMAL_ABNORMAL)),
    categorical("pcc", "Pus Cell Clumps", Vocabulary::Tokens(PRESENT_NOTPRESENT)),
    categorical("ba", "Bacteria", Vocabulary::Tokens(PRESENT_NOTPRESENT)),
    categorical("htn", "Hypertension", Vocabulary::Tokens(YES_NO)),
    categorical("dm", "Diabetes", Vocabulary::Tokens(YES_NO)),
    categorical("cad", "Coronary Artery Disease", Vocabulary::Tokens(YES_NO)),
    categorical("appet", "Appetite", Vocabulary::Tokens(GOOD_POOR)),
    categorical("pe", "Pedal Oedema", Vocabulary::Tokens(YES_NO)),
    categorical("ane", "Anaemia", Vocabulary::Tokens(YES_NO)),
];

pub fn field_defs() -> &'static [FieldDef] {
    &FIELDS
}

pub fn field_index(code: &str) -> Option<usize> {
    FIELDS.iter().position(|f| f.code == code)
}

pub fn field_def(code: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.code == code)
}

/// Display label for a feature code; unknown codes label as themselves.
pub fn feature_label(code: &str) -> &str {
    match field_def(code) {
        Some(def) => def.label,
        None => code,
    }
}

impl Vocabulary {
    pub fn encode(&self, raw: &str) -> Option<f64> {
        match self {
            Vocabulary::Tokens(tokens) => {
                let lower = raw.to_ascii_lowercase();
                tokens
                    .iter()
                    .find(|(token, _)| *token == lower)
                    .map(|(_, code)| *code)
            }
            Vocabulary::Levels(levels) => {
                let value: f64 = raw.parse().ok()?;
                levels.iter().copied().find(|l| (l - value).abs() < 1e-9)
            }
        }
    }
}
