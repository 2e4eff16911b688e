//! Pricing plan catalogue

use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// A purchasable pricing plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Price identifier as the billing backend knows it
    pub id: String,
    /// Default trial length for the plan, if it has one
    #[serde(default)]
    pub trial_days: Option<u32>,
}

/// The plans a checkout intent may reference
#[derive(Debug, Clone, Derivative)]
#[derivative(Default = "new")]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn from_plans(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// Looks up a plan by its price id
    pub fn get(&self, price_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == price_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_price_id() {
        let catalog = PlanCatalog::from_plans(vec![
            Plan {
                id: "price_basic_monthly".to_owned(),
                trial_days: None,
            },
            Plan {
                id: "price_pro_yearly".to_owned(),
                trial_days: Some(14),
            },
        ]);

        assert_eq!(
            catalog.get("price_pro_yearly").unwrap().trial_days,
            Some(14)
        );
        assert!(catalog.get("price_enterprise").is_none());
    }

    #[test]
    fn empty_catalog_knows_nothing() {
        let catalog = PlanCatalog::new();
        assert!(catalog.get("price_basic_monthly").is_none());
    }
}
