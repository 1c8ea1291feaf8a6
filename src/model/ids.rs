use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    LogisticRegression,
    Svm,
    DecisionTree,
    RandomForest,
    GradientBoosting,
    Xgboost,
    Catboost,
    Knn,
    NaiveBayes,
}

pub fn model_order() -> &'static [ModelId] {
    &[
        ModelId::LogisticRegression,
        ModelId::Svm,
        ModelId::DecisionTree,
        ModelId::RandomForest,
        ModelId::GradientBoosting,
        ModelId::Xgboost,
        ModelId::Catboost,
        ModelId::Knn,
        ModelId::NaiveBayes,
    ]
}

impl ModelId {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "logistic_regression",
            ModelId::Svm => "svm",
            ModelId::DecisionTree => "decision_tree",
            ModelId::RandomForest => "random_forest",
            ModelId::GradientBoosting => "gradient_boosting",
            ModelId::Xgboost => "xgboost",
            ModelId::Catboost => "catboost",
            ModelId::Knn => "knn",
            ModelId::NaiveBayes => "naive_bayes",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "Logistic Regression",
            ModelId::Svm => "SVM",
            ModelId::DecisionTree => "Decision Tree",
            ModelId::RandomForest => "Random Forest",
            ModelId::GradientBoosting => "Gradient Boosting",
            ModelId::Xgboost => "XGBoost",
            ModelId::Catboost => "CatBoost",
            ModelId::Knn => "K-Nearest Neighbors",
            ModelId::NaiveBayes => "Naive Bayes",
        }
    }

    pub fn parse(name: &str) -> Option<ModelId> {
        let key = name.trim().to_ascii_lowercase();
        model_order()
            .iter()
            .copied()
            .find(|m| m.as_str() == key || m.display_name().to_ascii_lowercase() == key)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
