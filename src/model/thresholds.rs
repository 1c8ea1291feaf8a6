use crate::model::ids::ModelId;

#[derive(Debug, Clone)]
pub struct EngineProfile {
    /// Numeric fields that must be present; empty passes absent values through as unknown.
    pub required_fields: &'static [&'static str],
    pub impact_top_n: usize,
    pub waterfall_cap: usize,
    pub narrative_risk_n: usize,
    pub narrative_protective_n: usize,
    pub specialist_marker: &'static str,
    pub default_explain_model: ModelId,
}

const NUMERIC_FIELDS: &[&str] = &[
    "age", "bp", "bgr", "bu", "sc", "sod", "pot", "hemo", "pcv", "wc", "rc",
];

impl EngineProfile {
    pub fn strict_v1() -> Self {
        Self {
            required_fields: NUMERIC_FIELDS,
            impact_top_n: 15,
            waterfall_cap: 15,
            narrative_risk_n: 4,
            narrative_protective_n: 3,
            specialist_marker: "Dr.",
            default_explain_model: ModelId::RandomForest,
        }
    }

    pub fn lenient_v1() -> Self {
        let mut base = Self::strict_v1();
        base.required_fields = &[];
        base
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::strict_v1()
    }
}
