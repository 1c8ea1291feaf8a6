pub mod checklists;
pub mod clinical;
pub mod ids;
pub mod roles;
pub mod stages;
pub mod thresholds;
pub mod verdict;

use std::collections::BTreeMap;

/// Signed per-feature contribution for one model: positive pushes toward CKD.
pub type Attribution = BTreeMap<String, f64>;

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
