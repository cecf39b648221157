use super::types::{BreakdownSlice, CalculationResult, YearPoint};

fn real_value(nominal: f64, inflation_rate_pct: f64, tax_rate_pct: f64, years: u32) -> f64 {
    let deflator = (1.0 + inflation_rate_pct / 100.0).powi(years as i32);
    nominal / deflator * (1.0 - tax_rate_pct / 100.0)
}

/// Restates a projection in today's money after a flat tax.
///
/// Each series point is discounted by its own year; the breakdown is
/// discounted over `horizon_years`. Tax applies to the whole discounted
/// figure, not only the gain. Milestones are timings and pass through.
pub fn to_real(
    result: &CalculationResult,
    inflation_rate_pct: f64,
    tax_rate_pct: f64,
    horizon_years: u32,
) -> CalculationResult {
    let chart_data = result
        .chart_data
        .iter()
        .map(|point| YearPoint {
            year: point.year,
            value: real_value(point.value, inflation_rate_pct, tax_rate_pct, point.year),
        })
        .collect();

    let breakdown = result.breakdown.map(|slice| BreakdownSlice {
        label: slice.label,
        value: real_value(slice.value, inflation_rate_pct, tax_rate_pct, horizon_years),
    });

    CalculationResult {
        chart_data,
        milestones: result.milestones.clone(),
        breakdown,
    }
}
