mod engine;
mod format;
mod real;
mod types;

pub use engine::{project, run};
pub use format::{
    format_currency, format_number_with_units, format_years_fraction, parse_formatted_value,
};
pub use real::to_real;
pub use types::{
    BreakdownSlice, CalculationParams, CalculationResult, DEFAULT_INFLATION_RATE,
    DEFAULT_TAX_RATE, MAX_YEARS, MILESTONE_UNIT, Milestone, Mode, ParamsError, RealTerms,
    YearPoint,
};
