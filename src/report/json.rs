use serde::Serialize;

use crate::pipeline::stage6_disclose::DisclosedAssessment;
use crate::pipeline::stage7_report::AssessmentRecord;

#[derive(Serialize)]
struct Envelope<'a, T> {
    tool: &'static str,
    version: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

fn render<T: Serialize>(body: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope {
        tool: "kira-ckdrisk",
        version: env!("CARGO_PKG_VERSION"),
        body,
    })
}

pub fn render_disclosed_json(disclosed: &DisclosedAssessment) -> Result<String, serde_json::Error> {
    render(disclosed)
}

pub fn render_record_json(record: &AssessmentRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}
