//! CPA calculator

use serde::Serialize;

use crate::domain::entities::round2;
use crate::error::ToolError;

/// CPA below this is highly efficient
pub const HIGH_EFFICIENCY_CPA: f64 = 100.0;

/// CPA at or above this needs optimisation
pub const LOW_EFFICIENCY_CPA: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpaInput {
    pub cost: f64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpaInterpretation {
    pub cost_per_conversion: String,
    pub conversions_per_cost: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpaCalculation {
    pub status: &'static str,
    pub input_parameters: CpaInput,
    pub calculated_cpa: f64,
    pub efficiency_note: String,
    pub efficiency_level: EfficiencyLevel,
    pub interpretation: CpaInterpretation,
}

pub fn calculate(cost: f64, conversions: u64) -> Result<CpaCalculation, ToolError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(ToolError::Validation("cost cannot be negative".to_string()));
    }
    if conversions == 0 {
        return Err(ToolError::ZeroConversions);
    }

    let cpa = cost / conversions as f64;

    let (efficiency_level, efficiency_note) = if cpa < HIGH_EFFICIENCY_CPA {
        (EfficiencyLevel::High, "Excellent efficiency, CPA is low")
    } else if cpa < LOW_EFFICIENCY_CPA {
        (EfficiencyLevel::Medium, "CPA is within normal range")
    } else {
        (EfficiencyLevel::Low, "CPA is high, optimization required")
    };

    let recommendation = if cpa > LOW_EFFICIENCY_CPA {
        "Lower the cost per click"
    } else if cpa > HIGH_EFFICIENCY_CPA {
        "Optimize conversion"
    } else {
        "Scale the successful campaign"
    };

    let conversions_per_cost = if cost > 0.0 {
        format!("{:.4}", conversions as f64 / cost)
    } else {
        "N/A".to_string()
    };

    Ok(CpaCalculation {
        status: "success",
        input_parameters: CpaInput { cost, conversions },
        calculated_cpa: round2(cpa),
        efficiency_note: efficiency_note.to_string(),
        efficiency_level,
        interpretation: CpaInterpretation {
            cost_per_conversion: format!("{:.2} RUB", cpa),
            conversions_per_cost,
            recommendation: recommendation.to_string(),
        },
    })
}
