// ============================================================
// Layer 3 — Model Score
// ============================================================
// One row of the accuracy summary: a model name and the
// fraction of test samples it classified correctly.
//
// The serde renames give the CSV its `Model,Accuracy` header.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    #[serde(rename = "Model")]
    pub model: String,

    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
}

impl ModelScore {
    pub fn new(model: impl Into<String>, accuracy: f64) -> Self {
        Self { model: model.into(), accuracy }
    }
}

/// Sort scores from most to least accurate. Equal scores keep their order.
pub fn rank_by_accuracy(scores: &mut [ModelScore]) {
    scores.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
}
