use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One crore. Milestones are reported in multiples of this.
pub const MILESTONE_UNIT: f64 = 10_000_000.0;
pub const MAX_YEARS: u32 = 50;
pub const DEFAULT_INFLATION_RATE: f64 = 5.0;
pub const DEFAULT_TAX_RATE: f64 = 12.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "accumulation", alias = "SIP")]
    Sip,
    #[serde(alias = "decumulation", alias = "SWP")]
    Swp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationParams {
    pub initial_investment: f64,
    pub monthly_amount: f64,
    pub expected_return_rate: f64,
    pub yearly_change_percentage: f64,
    pub years_to_project: u32,
    pub mode: Mode,
}

impl CalculationParams {
    pub fn defaults_for(mode: Mode) -> Self {
        match mode {
            Mode::Sip => Self {
                initial_investment: 1_000_000.0,
                monthly_amount: 15_000.0,
                expected_return_rate: 12.0,
                yearly_change_percentage: 10.0,
                years_to_project: 20,
                mode,
            },
            Mode::Swp => Self {
                initial_investment: 50_000_000.0,
                monthly_amount: 100_000.0,
                expected_return_rate: 10.0,
                yearly_change_percentage: 7.0,
                years_to_project: 30,
                mode,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        for (field, value) in [
            ("initialInvestment", self.initial_investment),
            ("monthlyAmount", self.monthly_amount),
            ("expectedReturnRate", self.expected_return_rate),
            ("yearlyChangePercentage", self.yearly_change_percentage),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite { field });
            }
        }

        for (field, value) in [
            ("initialInvestment", self.initial_investment),
            ("monthlyAmount", self.monthly_amount),
        ] {
            if value < 0.0 {
                return Err(ParamsError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("expectedReturnRate", self.expected_return_rate),
            ("yearlyChangePercentage", self.yearly_change_percentage),
        ] {
            if value <= -100.0 {
                return Err(ParamsError::RateTooLow { field, value });
            }
        }

        if self.mode == Mode::Sip && self.expected_return_rate < 0.0 {
            return Err(ParamsError::NegativeAccumulationReturn {
                value: self.expected_return_rate,
            });
        }

        if self.years_to_project > MAX_YEARS {
            return Err(ParamsError::HorizonTooLong {
                years: self.years_to_project,
                max: MAX_YEARS,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTerms {
    pub inflation_rate: f64,
    pub tax_rate: f64,
}

impl Default for RealTerms {
    fn default() -> Self {
        Self {
            inflation_rate: DEFAULT_INFLATION_RATE,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl RealTerms {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.inflation_rate.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "inflationRate",
            });
        }
        if !self.tax_rate.is_finite() {
            return Err(ParamsError::NonFinite { field: "taxRate" });
        }
        if self.inflation_rate <= -100.0 {
            return Err(ParamsError::RateTooLow {
                field: "inflationRate",
                value: self.inflation_rate,
            });
        }
        if !(0.0..=100.0).contains(&self.tax_rate) {
            return Err(ParamsError::TaxOutOfRange {
                value: self.tax_rate,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be > -100, got {value}")]
    RateTooLow { field: &'static str, value: f64 },

    #[error("expectedReturnRate must be >= 0 in sip mode, got {value}")]
    NegativeAccumulationReturn { value: f64 },

    #[error("yearsToProject must be <= {max}, got {years}")]
    HorizonTooLong { years: u32, max: u32 },

    #[error("taxRate must be between 0 and 100, got {value}")]
    TaxOutOfRange { value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub unit_count: u64,
    pub cumulative_years: f64,
    pub years_since_previous: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakdownSlice {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub chart_data: Vec<YearPoint>,
    pub milestones: Vec<Milestone>,
    pub breakdown: [BreakdownSlice; 2],
}

impl CalculationResult {
    pub fn final_value(&self) -> Option<f64> {
        self.chart_data.last().map(|point| point.value)
    }
}
