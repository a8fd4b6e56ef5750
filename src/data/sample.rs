//! Synthetic monthly HR metrics around per-department baselines.
//!
//! Every figure is a department baseline, nudged by a calendar-month seasonal
//! term and Gaussian noise, then clamped into a plausible range. The random
//! source is supplied by the caller so a fixed seed reproduces the same rows.

use rand::prelude::*;
use rand_distr::Normal;

use crate::domain::{GenerateConfig, Month, MonthlyRecord};
use crate::error::AppError;

/// Baseline behaviour for one department.
#[derive(Debug, Clone, Copy)]
pub struct DepartmentProfile {
    pub name: &'static str,
    /// Headcount in the first generated month.
    pub baseline_headcount: f64,
    /// Headcount added per month.
    pub monthly_trend: f64,
    /// Monthly turnover as a fraction.
    pub turnover_base: f64,
    pub time_to_fill_base: f64,
    /// Offer acceptance as a fraction.
    pub offer_acceptance_base: f64,
}

pub const DEPARTMENTS: [DepartmentProfile; 6] = [
    DepartmentProfile {
        name: "Engineering",
        baseline_headcount: 95.0,
        monthly_trend: 1.6,
        turnover_base: 0.011,
        time_to_fill_base: 47.0,
        offer_acceptance_base: 0.82,
    },
    DepartmentProfile {
        name: "Sales",
        baseline_headcount: 62.0,
        monthly_trend: 1.0,
        turnover_base: 0.019,
        time_to_fill_base: 34.0,
        offer_acceptance_base: 0.79,
    },
    DepartmentProfile {
        name: "Operations",
        baseline_headcount: 54.0,
        monthly_trend: 0.7,
        turnover_base: 0.015,
        time_to_fill_base: 31.0,
        offer_acceptance_base: 0.84,
    },
    DepartmentProfile {
        name: "HR",
        baseline_headcount: 18.0,
        monthly_trend: 0.2,
        turnover_base: 0.010,
        time_to_fill_base: 29.0,
        offer_acceptance_base: 0.86,
    },
    DepartmentProfile {
        name: "Finance",
        baseline_headcount: 21.0,
        monthly_trend: 0.15,
        turnover_base: 0.009,
        time_to_fill_base: 36.0,
        offer_acceptance_base: 0.81,
    },
    DepartmentProfile {
        name: "Customer Success",
        baseline_headcount: 37.0,
        monthly_trend: 0.8,
        turnover_base: 0.017,
        time_to_fill_base: 26.0,
        offer_acceptance_base: 0.83,
    },
];

const MIN_HEADCOUNT: f64 = 8.0;
const BASE_HIRE_RATE: f64 = 0.035;
const MIN_TIME_TO_FILL: f64 = 15.0;
const TURNOVER_RANGE: (f64, f64) = (0.004, 0.05);
const OFFER_ACCEPTANCE_RANGE: (f64, f64) = (0.62, 0.95);
/// Open requisitions per hire are drawn uniformly from this range.
const OPEN_PER_HIRE: (f64, f64) = (1.1, 2.2);

/// Noise (standard deviation) for each sampled quantity.
struct Noise {
    headcount: Normal<f64>,
    hires: Normal<f64>,
    turnover: Normal<f64>,
    terminations: Normal<f64>,
    open_positions: Normal<f64>,
    time_to_fill: Normal<f64>,
    offer_acceptance: Normal<f64>,
}

impl Noise {
    fn new() -> Result<Self, AppError> {
        let normal = |sd: f64| {
            Normal::new(0.0, sd).map_err(|e| AppError::Config(format!("Noise distribution error: {e}")))
        };
        Ok(Self {
            headcount: normal(1.2)?,
            hires: normal(1.0)?,
            turnover: normal(0.0035)?,
            terminations: normal(0.6)?,
            open_positions: normal(1.2)?,
            time_to_fill: normal(4.0)?,
            offer_acceptance: normal(0.03)?,
        })
    }
}

/// Generate `config.months` months of rows for every department in [`DEPARTMENTS`].
///
/// Rows are ordered month-major, departments in table order.
pub fn generate_records<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GenerateConfig,
) -> Result<Vec<MonthlyRecord>, AppError> {
    if config.months == 0 {
        return Err(AppError::Config("Month count must be > 0.".to_string()));
    }

    let noise = Noise::new()?;
    let mut records = Vec::with_capacity(config.months * DEPARTMENTS.len());
    let mut month = config.start_month;

    for month_idx in 0..config.months {
        if month_idx > 0 {
            month = month
                .next()
                .ok_or_else(|| AppError::Config(format!("Month range overflows after {month}.")))?;
        }
        for profile in &DEPARTMENTS {
            records.push(sample_department(rng, &noise, profile, month, month_idx));
        }
    }

    Ok(records)
}

fn sample_department<R: Rng + ?Sized>(
    rng: &mut R,
    noise: &Noise,
    profile: &DepartmentProfile,
    month: Month,
    month_idx: usize,
) -> MonthlyRecord {
    let m = month.number();

    let trend_hc = profile.baseline_headcount + profile.monthly_trend * month_idx as f64;
    let headcount = round_count((trend_hc + noise.headcount.sample(rng)).max(MIN_HEADCOUNT));

    let hire_rate = BASE_HIRE_RATE * seasonal_hiring_boost(m);
    let new_hires = round_count(f64::from(headcount) * hire_rate + noise.hires.sample(rng));

    let summer_attrition = if matches!(m, 7 | 8) { 0.002 } else { 0.0 };
    let turnover = clamp(
        profile.turnover_base + noise.turnover.sample(rng) + summer_attrition,
        TURNOVER_RANGE,
    );

    let terminations = round_count(f64::from(headcount) * turnover + noise.terminations.sample(rng));

    let per_hire = rng.gen_range(OPEN_PER_HIRE.0..OPEN_PER_HIRE.1);
    let open_positions = round_count(f64::from(new_hires) * per_hire + noise.open_positions.sample(rng));

    let autumn_speedup = if matches!(m, 10 | 11) { 1.0 } else { 0.0 };
    let time_to_fill = round_count(
        (profile.time_to_fill_base + noise.time_to_fill.sample(rng) - autumn_speedup).max(MIN_TIME_TO_FILL),
    );

    let summer_dip = if matches!(m, 6 | 7) { 0.015 } else { 0.0 };
    let offer_acceptance = clamp(
        profile.offer_acceptance_base + noise.offer_acceptance.sample(rng) - summer_dip,
        OFFER_ACCEPTANCE_RANGE,
    );

    MonthlyRecord {
        month,
        department: profile.name.to_string(),
        headcount,
        new_hires,
        terminations,
        open_positions,
        time_to_fill_days: time_to_fill,
        offer_acceptance_rate: round_to(offer_acceptance * 100.0, 1),
        turnover_rate: round_to(turnover * 100.0, 2),
    }
}

/// Spring and early-autumn hiring pushes.
fn seasonal_hiring_boost(month: u32) -> f64 {
    if matches!(month, 3 | 4 | 9 | 10) { 1.2 } else { 0.8 }
}

fn clamp(value: f64, (low, high): (f64, f64)) -> f64 {
    value.max(low).min(high)
}

/// Round to a non-negative count.
fn round_count(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
