use super::types::{LifeConfig, ProjectionRow, Scenario, ScenarioValues};

/// Income and expense for year `year_index`, compounded from year 1.
#[derive(Debug, Clone, Copy)]
struct YearCashflow {
    income: f64,
    expense: f64,
}

impl YearCashflow {
    fn for_year(config: &LifeConfig, year_index: u32) -> Self {
        let exponent = year_index as i32;
        Self {
            income: config.net_income_y1 * (1.0 + config.income_growth).powi(exponent),
            expense: config.expense_y1 * (1.0 + config.expense_growth).powi(exponent),
        }
    }

    fn saving(self) -> f64 {
        compute_saving(self.income, self.expense)
    }
}

pub fn compute_saving(income: f64, expense: f64) -> f64 {
    (income - expense).max(0.0)
}

/// Portion of a year's saving that is added to net worth.
///
/// Never negative and never borrows: a deficit year or a non-positive income
/// contributes nothing even when `min_contrib` is set, and every year at or
/// past `contribute_years` contributes nothing.
pub fn compute_contribution(
    config: &LifeConfig,
    income: f64,
    expense: f64,
    year_index: u32,
) -> f64 {
    if config
        .contribute_years
        .is_some_and(|cutoff| year_index >= cutoff)
    {
        return 0.0;
    }

    let saving = compute_saving(income, expense);
    if saving <= 0.0 || income <= 0.0 {
        return 0.0;
    }

    let mut raw = saving;
    if let Some(cap) = config.saving_rate_cap {
        raw = raw.min(income * cap);
    }

    let upper = config.max_contrib_limit().unwrap_or(f64::INFINITY);
    let contrib = raw.max(config.min_contrib).min(upper);

    if contrib > 0.0 { contrib } else { 0.0 }
}

/// Year-by-year cashflow and net worth for every scenario.
///
/// Returns exactly `horizon_years` rows; a zero horizon yields an empty
/// vector. Each scenario's net worth compounds at its own CAGR before the
/// year's contribution is added.
pub fn project(config: &LifeConfig) -> Vec<ProjectionRow> {
    let mut rows = Vec::with_capacity(config.horizon_years as usize);
    let mut net_worth = ScenarioValues::splat(config.start_nw_vnd);

    for year_index in 0..config.horizon_years {
        let year = config.start_year + year_index as i32;
        let cashflow = YearCashflow::for_year(config, year_index);
        let contrib =
            compute_contribution(config, cashflow.income, cashflow.expense, year_index);

        for scenario in Scenario::ALL {
            net_worth[scenario] = net_worth[scenario] * (1.0 + config.cagr[scenario]) + contrib;
        }

        rows.push(ProjectionRow {
            year,
            age: year - config.birth_year,
            income: cashflow.income,
            expense: cashflow.expense,
            saving: cashflow.saving(),
            contrib,
            nw_vnd: net_worth,
            nw_usd: net_worth.map(|_, vnd| vnd / config.fx_vnd_per_usd),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_config() -> LifeConfig {
        LifeConfig {
            name: "A".to_string(),
            spouse_name: "B".to_string(),
            birth_year: 1991,
            start_year: 2026,
            horizon_years: 10,
            fx_vnd_per_usd: 27_000.0,
            start_nw_vnd: 0.0,
            net_income_y1: 3_000_000_000.0,
            income_growth: 0.06,
            expense_y1: 2_000_000_000.0,
            expense_growth: 0.05,
            min_contrib: 0.0,
            max_contrib: None,
            saving_rate_cap: Some(0.6),
            contribute_years: None,
            cagr: ScenarioValues {
                bear: 0.12,
                base: 0.18,
                bull: 0.24,
            },
            income_source: None,
        }
    }

    fn flat_config() -> LifeConfig {
        let mut config = sample_config();
        config.horizon_years = 4;
        config.fx_vnd_per_usd = 1.0;
        config.start_nw_vnd = 0.0;
        config.net_income_y1 = 1_000.0;
        config.income_growth = 0.0;
        config.expense_y1 = 0.0;
        config.expense_growth = 0.0;
        config.saving_rate_cap = None;
        config.cagr = ScenarioValues::splat(0.0);
        config
    }

    #[test]
    fn one_year_baseline_matches_hand_computation() {
        let mut config = sample_config();
        config.horizon_years = 1;
        config.start_nw_vnd = 8_490_000_000.0;
        config.income_growth = 0.0;
        config.expense_growth = 0.0;
        config.saving_rate_cap = None;
        config.cagr = ScenarioValues::splat(0.10);

        let rows = project(&config);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.year, 2026);
        assert_eq!(row.age, 35);
        assert_approx(row.saving, 1_000_000_000.0);
        assert_approx(row.contrib, 1_000_000_000.0);
        assert_approx_tol(row.nw_vnd.base, 10_339_000_000.0, 1e-3);
        assert_approx_tol(row.nw_usd.base, 382_925.925_925_9, 1e-3);
        assert_eq!(row.nw_vnd.bear, row.nw_vnd.bull);
    }

    #[test]
    fn contribute_years_stops_contributions_after_cutoff() {
        let mut config = flat_config();
        config.contribute_years = Some(2);

        let rows = project(&config);
        let contribs = rows.iter().map(|r| r.contrib).collect::<Vec<_>>();
        assert_eq!(contribs, vec![1_000.0, 1_000.0, 0.0, 0.0]);
        assert_approx(rows[3].nw_vnd.base, 2_000.0);
    }

    #[test]
    fn contribute_years_zero_never_contributes() {
        let mut config = flat_config();
        config.contribute_years = Some(0);

        assert!(project(&config).iter().all(|r| r.contrib == 0.0));
    }

    #[test]
    fn zero_horizon_yields_no_rows() {
        let mut config = sample_config();
        config.horizon_years = 0;
        assert!(project(&config).is_empty());
    }

    #[test]
    fn unbounded_max_contrib_does_not_produce_nan() {
        let mut config = flat_config();
        config.max_contrib = Some(f64::INFINITY);
        let rows = project(&config);
        assert!(rows.iter().all(|r| r.contrib.is_finite()));
        assert_approx(rows[0].contrib, 1_000.0);

        config.max_contrib = None;
        assert_eq!(project(&config), rows);
    }

    #[test]
    fn contribution_respects_saving_rate_cap_and_bounds() {
        let mut config = flat_config();
        config.saving_rate_cap = Some(0.3);
        assert_approx(compute_contribution(&config, 1_000.0, 0.0, 0), 300.0);

        config.max_contrib = Some(250.0);
        assert_approx(compute_contribution(&config, 1_000.0, 0.0, 0), 250.0);

        config.max_contrib = None;
        config.min_contrib = 500.0;
        assert_approx(compute_contribution(&config, 1_000.0, 0.0, 0), 500.0);
    }

    #[test]
    fn contribution_never_borrows_against_a_deficit() {
        let mut config = flat_config();
        config.min_contrib = 500.0;

        assert_approx(compute_contribution(&config, 1_000.0, 1_000.0, 0), 0.0);
        assert_approx(compute_contribution(&config, 1_000.0, 1_500.0, 0), 0.0);
        assert_approx(compute_contribution(&config, 0.0, 0.0, 0), 0.0);
    }

    #[test]
    fn zero_max_contrib_yields_zero() {
        let mut config = flat_config();
        config.max_contrib = Some(0.0);
        assert_approx(compute_contribution(&config, 1_000.0, 0.0, 0), 0.0);
    }

    #[test]
    fn income_and_expense_compound_exponentially() {
        let mut config = sample_config();
        config.horizon_years = 3;
        let rows = project(&config);
        assert_approx_tol(rows[2].income, 3_000_000_000.0 * 1.06_f64.powi(2), 1e-3);
        assert_approx_tol(rows[2].expense, 2_000_000_000.0 * 1.05_f64.powi(2), 1e-3);
        assert_approx_tol(rows[2].saving, rows[2].income - rows[2].expense, 1e-3);
    }

    #[test]
    fn saving_is_floored_at_zero() {
        let mut config = sample_config();
        config.expense_y1 = 4_000_000_000.0;
        assert!(project(&config).iter().all(|r| r.saving == 0.0 && r.contrib == 0.0));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_rows_follow_compounding_recurrence(
            horizon in 0u32..121,
            start_nw in 0u64..20_000_000_000,
            income in 0u64..5_000_000_000,
            expense in 0u64..5_000_000_000,
            income_growth_bp in -500i32..1500,
            expense_growth_bp in -500i32..1500,
            bear_bp in -3000i32..3000,
            base_bp in -3000i32..4000,
            bull_bp in -3000i32..5000,
            fx in 1u32..40_000,
            cap_pct in proptest::option::of(0u32..101),
            cutoff in proptest::option::of(0u32..130)
        ) {
            let mut config = sample_config();
            config.horizon_years = horizon;
            config.start_nw_vnd = start_nw as f64;
            config.net_income_y1 = income as f64;
            config.expense_y1 = expense as f64;
            config.income_growth = income_growth_bp as f64 / 10_000.0;
            config.expense_growth = expense_growth_bp as f64 / 10_000.0;
            config.cagr = ScenarioValues {
                bear: bear_bp as f64 / 10_000.0,
                base: base_bp as f64 / 10_000.0,
                bull: bull_bp as f64 / 10_000.0,
            };
            config.fx_vnd_per_usd = fx as f64;
            config.saving_rate_cap = cap_pct.map(|p| p as f64 / 100.0);
            config.contribute_years = cutoff;

            let rows = project(&config);
            prop_assert_eq!(rows.len(), horizon as usize);

            let mut previous = ScenarioValues::splat(config.start_nw_vnd);
            for (idx, row) in rows.iter().enumerate() {
                prop_assert_eq!(row.year, config.start_year + idx as i32);
                prop_assert!(row.contrib >= 0.0);
                prop_assert!(row.saving >= 0.0);
                for scenario in Scenario::ALL {
                    let expected =
                        previous[scenario] * (1.0 + config.cagr[scenario]) + row.contrib;
                    prop_assert_eq!(row.nw_vnd[scenario], expected);
                    prop_assert_eq!(
                        row.nw_usd[scenario],
                        row.nw_vnd[scenario] / config.fx_vnd_per_usd
                    );
                    prop_assert!(row.nw_vnd[scenario].is_finite());
                }
                previous = row.nw_vnd;
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_project_is_idempotent(
            horizon in 0u32..80,
            income_growth_bp in -500i32..1500,
            base_bp in -2000i32..4000
        ) {
            let mut config = sample_config();
            config.horizon_years = horizon;
            config.income_growth = income_growth_bp as f64 / 10_000.0;
            config.cagr.base = base_bp as f64 / 10_000.0;

            prop_assert_eq!(project(&config), project(&config));
        }

        #[test]
        fn prop_raising_max_contrib_never_lowers_contributions(
            low in 0u64..3_000_000_000,
            extra in 0u64..3_000_000_000,
            min_contrib in 0u64..1_500_000_000,
            cap_pct in proptest::option::of(0u32..101)
        ) {
            let mut config = sample_config();
            config.horizon_years = 30;
            config.min_contrib = min_contrib as f64;
            config.saving_rate_cap = cap_pct.map(|p| p as f64 / 100.0);

            config.max_contrib = Some(low as f64);
            let lower = project(&config);
            config.max_contrib = Some((low + extra) as f64);
            let higher = project(&config);
            config.max_contrib = None;
            let unbounded = project(&config);

            for idx in 0..lower.len() {
                prop_assert!(higher[idx].contrib >= lower[idx].contrib);
                prop_assert!(unbounded[idx].contrib >= higher[idx].contrib);
            }
        }
    }
}
