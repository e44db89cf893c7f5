//! Budget scenarios for reaching a conversion target

use serde::Serialize;

use crate::domain::entities::{round2, CampaignMetrics};
use crate::error::ToolError;

/// CPA improvement assumed by the optimised scenario
pub const CPA_IMPROVEMENT: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentPerformance {
    pub conversions: u64,
    pub cost: f64,
    pub cpa: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetScenario {
    pub target_conversions: u64,
    pub required_budget: f64,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentBudgetScenario {
    pub possible_conversions: f64,
    pub current_budget: f64,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSet {
    pub keep_current_cpa: BudgetScenario,
    pub improve_cpa_20pct: BudgetScenario,
    pub at_current_budget: CurrentBudgetScenario,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scenarios {
    pub campaign_id: String,
    pub current_performance: CurrentPerformance,
    pub scenarios: ScenarioSet,
    pub recommendations: Vec<String>,
    pub note: String,
}

pub fn calculate(
    campaign_id: &str,
    metrics: &CampaignMetrics,
    target_conversions: u64,
    data_source: &str,
) -> Result<Scenarios, ToolError> {
    if target_conversions == 0 {
        return Err(ToolError::Validation(
            "target_conversions must be greater than zero".to_string(),
        ));
    }

    let current_cost = metrics.total_cost;
    let current_conversions = metrics.total_conversions;
    let current_cpa = if current_conversions > 0 {
        current_cost / current_conversions as f64
    } else {
        0.0
    };

    let target = target_conversions as f64;
    let budget_current_cpa = target * current_cpa;

    let improved_cpa = current_cpa * (1.0 - CPA_IMPROVEMENT);
    let budget_improved = target * improved_cpa;

    let conversions_at_current_budget = if current_cpa > 0.0 {
        current_cost / current_cpa
    } else {
        0.0
    };

    Ok(Scenarios {
        campaign_id: campaign_id.to_string(),
        current_performance: CurrentPerformance {
            conversions: current_conversions,
            cost: round2(current_cost),
            cpa: round2(current_cpa),
        },
        scenarios: ScenarioSet {
            keep_current_cpa: BudgetScenario {
                target_conversions,
                required_budget: round2(budget_current_cpa),
                note: format!("At CPA {:.2} RUB", current_cpa),
            },
            improve_cpa_20pct: BudgetScenario {
                target_conversions,
                required_budget: round2(budget_improved),
                note: format!("At CPA {:.2} RUB (20% better)", improved_cpa),
            },
            at_current_budget: CurrentBudgetScenario {
                possible_conversions: (conversions_at_current_budget * 10.0).round() / 10.0,
                current_budget: round2(current_cost),
                note: "Without increasing the budget".to_string(),
            },
        },
        recommendations: vec![
            format!(
                "{} conversions need {:.0} RUB at the current CPA",
                target_conversions, budget_current_cpa
            ),
            format!(
                "With CPA optimized by 20% you need {:.0} RUB",
                budget_improved
            ),
            format!(
                "The current budget can bring ~{:.0} conversions",
                conversions_at_current_budget
            ),
        ],
        note: format!(
            "Calculated from {} performance over the last {} days.",
            data_source, metrics.days_analyzed
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::metrics_with;

    #[test]
    fn test_scenarios_from_known_performance() {
        // CPA 150
        let metrics = metrics_with(15000.0, 100, 1000, 10000, 7);
        let result = calculate("12345", &metrics, 200, "demo_data").unwrap();

        assert_eq!(result.current_performance.cpa, 150.0);
        assert_eq!(result.current_performance.conversions, 100);

        let s = &result.scenarios;
        assert_eq!(s.keep_current_cpa.required_budget, 30000.0);
        assert_eq!(s.keep_current_cpa.note, "At CPA 150.00 RUB");
        assert_eq!(s.improve_cpa_20pct.required_budget, 24000.0);
        assert_eq!(s.improve_cpa_20pct.note, "At CPA 120.00 RUB (20% better)");
        assert_eq!(s.at_current_budget.possible_conversions, 100.0);
        assert_eq!(s.at_current_budget.current_budget, 15000.0);

        assert_eq!(
            result.recommendations[0],
            "200 conversions need 30000 RUB at the current CPA"
        );
        assert_eq!(result.recommendations.len(), 3);
        assert!(result.note.contains("demo"));
    }

    #[test]
    fn test_campaign_without_conversions_yields_zero_budgets() {
        let metrics = metrics_with(5000.0, 0, 300, 3000, 7);
        let result = calculate("1", &metrics, 50, "demo_data").unwrap();

        assert_eq!(result.current_performance.cpa, 0.0);
        assert_eq!(result.scenarios.keep_current_cpa.required_budget, 0.0);
        assert_eq!(result.scenarios.at_current_budget.possible_conversions, 0.0);
    }

    #[test]
    fn test_zero_target_is_rejected() {
        let metrics = metrics_with(15000.0, 100, 1000, 10000, 7);
        let err = calculate("1", &metrics, 0, "demo_data").unwrap_err();
        assert!(err.to_string().contains("target_conversions"));
    }
}
