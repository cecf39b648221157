use log::{debug, trace, warn};

use super::real::to_real;
use super::types::{
    BreakdownSlice, CalculationParams, CalculationResult, MILESTONE_UNIT, Milestone, Mode,
    ParamsError, RealTerms, YearPoint,
};

const MONTHS_PER_YEAR: u32 = 12;
const MAX_MILESTONES: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Ledger {
    balance: f64,
    flowed: f64,
    monthly_amount: f64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum MonthOutcome {
    Continue,
    Exhausted,
}

/// Mode-specific cash movement. The yearly loop is generic over this so the
/// mode is resolved once per run instead of on every month.
trait CashflowStrategy {
    fn open(&self, params: &CalculationParams) -> Ledger;
    fn is_active(&self, ledger: &Ledger) -> bool;
    fn advance_month(&self, ledger: &mut Ledger, monthly_growth: f64) -> MonthOutcome;
    fn close_year(&self, ledger: &mut Ledger);
    fn breakdown(&self, ledger: &Ledger) -> [BreakdownSlice; 2];
}

struct Contribution;

impl CashflowStrategy for Contribution {
    fn open(&self, params: &CalculationParams) -> Ledger {
        Ledger {
            balance: params.initial_investment,
            flowed: params.initial_investment,
            monthly_amount: params.monthly_amount,
        }
    }

    fn is_active(&self, _ledger: &Ledger) -> bool {
        true
    }

    fn advance_month(&self, ledger: &mut Ledger, monthly_growth: f64) -> MonthOutcome {
        ledger.balance += ledger.monthly_amount;
        ledger.flowed += ledger.monthly_amount;
        ledger.balance *= monthly_growth;
        MonthOutcome::Continue
    }

    fn close_year(&self, _ledger: &mut Ledger) {}

    fn breakdown(&self, ledger: &Ledger) -> [BreakdownSlice; 2] {
        [
            BreakdownSlice {
                label: "invested",
                value: ledger.flowed,
            },
            BreakdownSlice {
                label: "profit",
                value: ledger.balance - ledger.flowed,
            },
        ]
    }
}

struct Withdrawal;

impl CashflowStrategy for Withdrawal {
    fn open(&self, params: &CalculationParams) -> Ledger {
        Ledger {
            balance: params.initial_investment,
            flowed: 0.0,
            monthly_amount: params.monthly_amount,
        }
    }

    fn is_active(&self, ledger: &Ledger) -> bool {
        ledger.balance > 0.0
    }

    fn advance_month(&self, ledger: &mut Ledger, monthly_growth: f64) -> MonthOutcome {
        ledger.balance *= monthly_growth;
        if ledger.balance >= ledger.monthly_amount {
            ledger.balance -= ledger.monthly_amount;
            ledger.flowed += ledger.monthly_amount;
            MonthOutcome::Continue
        } else {
            ledger.flowed += ledger.balance;
            ledger.balance = 0.0;
            MonthOutcome::Exhausted
        }
    }

    // A balance that would be reported as 0 ends the projection.
    fn close_year(&self, ledger: &mut Ledger) {
        if ledger.balance > 0.0 && ledger.balance.round() == 0.0 {
            ledger.flowed += ledger.balance;
            ledger.balance = 0.0;
        }
    }

    fn breakdown(&self, ledger: &Ledger) -> [BreakdownSlice; 2] {
        [
            BreakdownSlice {
                label: "remaining",
                value: ledger.balance,
            },
            BreakdownSlice {
                label: "withdrawn",
                value: ledger.flowed,
            },
        ]
    }
}

struct MilestoneDetector {
    reached_units: u64,
    last_cumulative_years: f64,
    milestones: Vec<Milestone>,
}

impl MilestoneDetector {
    fn new(initial_investment: f64) -> Self {
        Self {
            reached_units: units_held(initial_investment),
            last_cumulative_years: 0.0,
            milestones: Vec::new(),
        }
    }

    fn observe_year(&mut self, year: u32, year_start_value: f64, year_end_value: f64) {
        let current_units = units_held(year_end_value);
        let capacity = MAX_MILESTONES.saturating_sub(self.milestones.len()) as u64;
        let last_unit = current_units.min(self.reached_units.saturating_add(capacity));
        if last_unit < current_units && capacity > 0 {
            warn!("year {year}: milestone table full at {MAX_MILESTONES} entries");
        }
        if last_unit <= self.reached_units {
            return;
        }

        for unit_count in (self.reached_units + 1)..=last_unit {
            let target = unit_count as f64 * MILESTONE_UNIT;
            let Some(fraction) = crossing_fraction(year_start_value, year_end_value, target) else {
                trace!("year {year}: flat balance, skipping milestone interpolation");
                return;
            };

            let cumulative_years = (year - 1) as f64 + fraction;
            self.milestones.push(Milestone {
                unit_count,
                cumulative_years,
                years_since_previous: cumulative_years - self.last_cumulative_years,
            });
            self.last_cumulative_years = cumulative_years;
            self.reached_units = unit_count;
        }
    }

    fn into_milestones(self) -> Vec<Milestone> {
        self.milestones
    }
}

fn units_held(value: f64) -> u64 {
    if value <= 0.0 {
        return 0;
    }
    (value / MILESTONE_UNIT).floor() as u64
}

/// Fraction of the year at which a geometric path from `start` to `end`
/// passes `target`. Falls back to a straight line when the path starts at
/// zero, and yields `None` when the year had no movement.
fn crossing_fraction(start: f64, end: f64, target: f64) -> Option<f64> {
    if start == end {
        return None;
    }

    let fraction = if start > 0.0 && end > 0.0 {
        (target / start).ln() / (end / start).ln()
    } else {
        (target - start) / (end - start)
    };

    if fraction.is_finite() {
        Some(fraction.clamp(0.0, 1.0))
    } else {
        None
    }
}

fn simulate<S: CashflowStrategy>(strategy: S, params: &CalculationParams) -> CalculationResult {
    let monthly_growth = 1.0 + params.expected_return_rate / 1200.0;
    let step_up = 1.0 + params.yearly_change_percentage / 100.0;

    let mut ledger = strategy.open(params);
    let mut detector = MilestoneDetector::new(params.initial_investment);
    let mut chart_data = Vec::with_capacity(params.years_to_project as usize);

    for year in 1..=params.years_to_project {
        if !strategy.is_active(&ledger) {
            debug!("balance exhausted before year {year}");
            break;
        }

        let year_start_value = ledger.balance;
        for _ in 0..MONTHS_PER_YEAR {
            if strategy.advance_month(&mut ledger, monthly_growth) == MonthOutcome::Exhausted {
                break;
            }
        }
        strategy.close_year(&mut ledger);

        chart_data.push(YearPoint {
            year,
            value: ledger.balance.round(),
        });
        detector.observe_year(year, year_start_value, ledger.balance);
        ledger.monthly_amount *= step_up;
    }

    let milestones = detector.into_milestones();
    debug!(
        "simulated {} of {} years, {} milestones, closing balance {:.2}",
        chart_data.len(),
        params.years_to_project,
        milestones.len(),
        ledger.balance
    );

    CalculationResult {
        chart_data,
        milestones,
        breakdown: strategy.breakdown(&ledger),
    }
}

pub fn run(params: &CalculationParams) -> CalculationResult {
    match params.mode {
        Mode::Sip => simulate(Contribution, params),
        Mode::Swp => simulate(Withdrawal, params),
    }
}

pub fn project(
    params: &CalculationParams,
    real: Option<RealTerms>,
) -> Result<CalculationResult, ParamsError> {
    params.validate()?;
    if let Some(terms) = &real {
        terms.validate()?;
    }

    let nominal = run(params);
    Ok(match real {
        Some(terms) => to_real(
            &nominal,
            terms.inflation_rate,
            terms.tax_rate,
            params.years_to_project,
        ),
        None => nominal,
    })
}
