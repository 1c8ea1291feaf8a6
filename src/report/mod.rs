pub mod json;
pub mod text;

pub fn format_signed_4(v: f64) -> String {
    format!("{:+.4}", v)
}

pub fn format_pct_1(v: f64) -> String {
    format!("{:.1}%", v)
}

pub fn format_pct_2(v: f64) -> String {
    format!("{:.2}%", v)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
