//! Known model catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RANDOM_FOREST: &str = "Random_Forest";
pub const GRADIENT_BOOSTING: &str = "Gradient_Boosting";
pub const LOGISTIC_REGRESSION: &str = "Logistic_Regression";

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = RANDOM_FOREST;

/// Static description of a catalog model
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub const CATALOG: [CatalogEntry; 3] = [
    CatalogEntry {
        name: RANDOM_FOREST,
        display_name: "随机森林",
        description: "基于随机森林算法的分类模型，适合处理复杂的非线性关系",
    },
    CatalogEntry {
        name: GRADIENT_BOOSTING,
        display_name: "梯度提升",
        description: "基于梯度提升算法的集成学习模型，具有较高的预测精度",
    },
    CatalogEntry {
        name: LOGISTIC_REGRESSION,
        display_name: "逻辑回归",
        description: "基于逻辑回归的线性分类模型，速度快且易于解释",
    },
];

pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

/// Whether inputs to this model must be standardized first
pub fn requires_scaling(model_name: &str) -> bool {
    model_name == LOGISTIC_REGRESSION
}

/// Listing entry combining catalog data with runtime state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// The artifact resolves in the model directory
    pub available: bool,
    /// This is the current default model
    pub selected: bool,
    /// The model is already in the cache
    pub loaded: bool,
    /// When the cached model was loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ModelInfo {
    pub fn describe(
        name: &str,
        available: bool,
        selected: bool,
        loaded_at: Option<DateTime<Utc>>,
    ) -> Self {
        let (display_name, description) = match lookup(name) {
            Some(entry) => (entry.display_name.to_string(), entry.description.to_string()),
            None => (name.to_string(), String::new()),
        };
        Self {
            name: name.to_string(),
            display_name,
            description,
            available,
            selected,
            loaded: loaded_at.is_some(),
            loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_logistic_regression_is_scaled() {
        assert!(requires_scaling(LOGISTIC_REGRESSION));
        assert!(!requires_scaling(RANDOM_FOREST));
        assert!(!requires_scaling("logistic_regression"));
    }

    #[test]
    fn test_describe_unknown_model() {
        let info = ModelInfo::describe("Custom_Model", true, false, None);
        assert_eq!(info.display_name, "Custom_Model");
        assert!(info.description.is_empty());
        assert!(!info.loaded);

        let info = ModelInfo::describe(GRADIENT_BOOSTING, false, false, Some(Utc::now()));
        assert_eq!(info.display_name, "梯度提升");
        assert!(info.loaded);
    }
}
