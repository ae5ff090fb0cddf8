use std::cmp::Reverse;

use super::constants::{
    ALERT_ANALYSIS_WINDOW_YEARS, BUFFER_THIN_CAUTION, BUFFER_THIN_WATCH, CONTRIB_CAP_CAUTION_RATE,
    CONTRIB_CAP_WATCH_RATE, HIGH_CAGR_CAUTION, HIGH_CAGR_WATCH, LIFESTYLE_INFLATION_CAUTION,
    LIFESTYLE_INFLATION_WATCH, MILESTONE_SLIPPAGE_CAUTION, MILESTONE_SLIPPAGE_WATCH,
    NO_FUEL_CAUTION_STREAK, NO_FUEL_WATCH_STREAK,
};
use super::types::{
    Alert, AlertCounts, AlertDigest, AlertId, AlertStatus, LifeConfig, ProjectionRow,
};

/// Optional baseline for the milestone slippage rule: the year of the
/// smallest base-scenario milestone in the latest snapshot and now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertContext {
    pub last_snapshot_next_base_year: Option<i32>,
    pub current_next_base_year: Option<i32>,
}

struct Finding {
    status: AlertStatus,
    message: String,
    hint: Option<String>,
}

impl Finding {
    fn new(status: AlertStatus, message: &str, hint: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Runs every rule once and orders the findings caution, watch, ok.
/// Rules sharing a status keep their registration order.
pub fn compute_alerts(
    config: &LifeConfig,
    rows: &[ProjectionRow],
    context: &AlertContext,
) -> Vec<Alert> {
    let mut alerts = AlertId::ALL
        .iter()
        .map(|&id| {
            let finding = evaluate_rule(id, config, rows, context);
            Alert {
                id,
                title: rule_title(id).to_string(),
                status: finding.status,
                message: finding.message,
                hint: finding.hint,
            }
        })
        .collect::<Vec<_>>();

    alerts.sort_by_key(|alert| Reverse(alert.status.rank()));
    alerts
}

/// Worst status plus per-status counts.
pub fn digest_alerts(alerts: &[Alert]) -> AlertDigest {
    let mut counts = AlertCounts::default();
    for alert in alerts {
        match alert.status {
            AlertStatus::Caution => counts.caution += 1,
            AlertStatus::Watch => counts.watch += 1,
            AlertStatus::Ok => counts.ok += 1,
        }
    }

    let worst = if counts.caution > 0 {
        AlertStatus::Caution
    } else if counts.watch > 0 {
        AlertStatus::Watch
    } else {
        AlertStatus::Ok
    };

    AlertDigest { worst, counts }
}

fn rule_title(id: AlertId) -> &'static str {
    match id {
        AlertId::LifestyleInflation => "Lifestyle inflation",
        AlertId::CashflowDeficit => "Cashflow deficit",
        AlertId::NoFuel => "No compounding fuel",
        AlertId::ClampedByMax => "Contribution capped by max",
        AlertId::CappedByRate => "Contribution capped by saving rate",
        AlertId::HighCagr => "Base CAGR very high",
        AlertId::MilestoneSlippage => "Milestone slippage",
        AlertId::BufferThin => "Safety buffer thin",
    }
}

fn evaluate_rule(
    id: AlertId,
    config: &LifeConfig,
    rows: &[ProjectionRow],
    context: &AlertContext,
) -> Finding {
    match id {
        AlertId::LifestyleInflation => lifestyle_inflation(config),
        AlertId::CashflowDeficit => cashflow_deficit(config),
        AlertId::NoFuel => no_fuel(rows),
        AlertId::ClampedByMax => clamped_by_max(config, rows),
        AlertId::CappedByRate => capped_by_rate(config, rows),
        AlertId::HighCagr => high_cagr(config),
        AlertId::MilestoneSlippage => milestone_slippage(context),
        AlertId::BufferThin => buffer_thin(config),
    }
}

fn status_at_least(value: f64, watch: f64, caution: f64) -> AlertStatus {
    if value >= caution {
        AlertStatus::Caution
    } else if value >= watch {
        AlertStatus::Watch
    } else {
        AlertStatus::Ok
    }
}

fn status_above(value: f64, watch: f64, caution: f64) -> AlertStatus {
    if value > caution {
        AlertStatus::Caution
    } else if value > watch {
        AlertStatus::Watch
    } else {
        AlertStatus::Ok
    }
}

fn lifestyle_inflation(config: &LifeConfig) -> Finding {
    let diff = config.expense_growth - config.income_growth;
    Finding::new(
        status_at_least(diff, LIFESTYLE_INFLATION_WATCH, LIFESTYLE_INFLATION_CAUTION),
        "Expenses grow faster than income, so milestones drift further out every year.",
        "Lower expense growth, raise income growth, or cap spending.",
    )
}

fn cashflow_deficit(config: &LifeConfig) -> Finding {
    let status = if config.net_income_y1 - config.expense_y1 < 0.0 {
        AlertStatus::Caution
    } else {
        AlertStatus::Ok
    };
    Finding::new(
        status,
        "Year-1 expenses exceed net income, so the plan rests entirely on CAGR.",
        "Reduce year-1 expense or raise year-1 net income to get a positive saving.",
    )
}

fn longest_zero_saving_streak(rows: &[ProjectionRow]) -> usize {
    let mut longest = 0;
    let mut streak = 0;
    for row in rows {
        if row.saving == 0.0 {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }
    longest
}

fn no_fuel(rows: &[ProjectionRow]) -> Finding {
    let streak = longest_zero_saving_streak(rows);
    let status = if streak >= NO_FUEL_CAUTION_STREAK {
        AlertStatus::Caution
    } else if streak >= NO_FUEL_WATCH_STREAK {
        AlertStatus::Watch
    } else {
        AlertStatus::Ok
    };
    Finding::new(
        status,
        "Several years in a row have zero saving, leaving nothing to compound.",
        "Increase net income or cut expenses.",
    )
}

/// Share of the leading analysis window for which `predicate` holds.
fn window_rate(rows: &[ProjectionRow], predicate: impl Fn(&ProjectionRow) -> bool) -> f64 {
    let window = &rows[..rows.len().min(ALERT_ANALYSIS_WINDOW_YEARS)];
    if window.is_empty() {
        return 0.0;
    }
    let hits = window.iter().filter(|r| predicate(r)).count();
    hits as f64 / window.len() as f64
}

fn clamped_by_max(config: &LifeConfig, rows: &[ProjectionRow]) -> Finding {
    let rate = match config.max_contrib_limit() {
        Some(max) => window_rate(rows, |r| r.saving > 0.0 && r.saving > max),
        None => 0.0,
    };
    Finding::new(
        status_at_least(rate, CONTRIB_CAP_WATCH_RATE, CONTRIB_CAP_CAUTION_RATE),
        "The max contribution limits what goes in even though saving is left over.",
        "Raise the max contribution if you can really put more in.",
    )
}

fn capped_by_rate(config: &LifeConfig, rows: &[ProjectionRow]) -> Finding {
    let rate = match config.saving_rate_cap {
        Some(cap) => window_rate(rows, |r| r.saving > 0.0 && r.income * cap < r.saving),
        None => 0.0,
    };
    Finding::new(
        status_at_least(rate, CONTRIB_CAP_WATCH_RATE, CONTRIB_CAP_CAUTION_RATE),
        "The saving-rate cap on income is holding contributions back.",
        "Loosen the saving-rate cap to reach milestones sooner.",
    )
}

fn high_cagr(config: &LifeConfig) -> Finding {
    Finding::new(
        status_above(config.cagr.base, HIGH_CAGR_WATCH, HIGH_CAGR_CAUTION),
        "The base CAGR is very high for a long horizon and sets unrealistic expectations.",
        "Focus on controllables (saving) and keep the bear/base/bull range sensible.",
    )
}

// Compares only the year of the smallest base milestone; the two configs may
// differ completely, so this is a coarse signal.
fn milestone_slippage(context: &AlertContext) -> Finding {
    let (Some(last), Some(current)) = (
        context.last_snapshot_next_base_year,
        context.current_next_base_year,
    ) else {
        return Finding {
            status: AlertStatus::Ok,
            message: "No snapshot yet to measure milestone slippage against.".to_string(),
            hint: None,
        };
    };

    let slip = current - last;
    let status = if slip >= MILESTONE_SLIPPAGE_CAUTION {
        AlertStatus::Caution
    } else if slip >= MILESTONE_SLIPPAGE_WATCH {
        AlertStatus::Watch
    } else {
        AlertStatus::Ok
    };

    if slip > 0 {
        Finding {
            status,
            message: format!(
                "Next base milestone is {slip} year(s) later than in the latest snapshot."
            ),
            hint: Some("Review the expense, income and contribution assumptions.".to_string()),
        }
    } else {
        Finding {
            status,
            message: "Milestones are on time or faster than in the latest snapshot.".to_string(),
            hint: None,
        }
    }
}

fn buffer_thin(config: &LifeConfig) -> Finding {
    let ratio = if config.net_income_y1 > 0.0 {
        config.expense_y1 / config.net_income_y1
    } else {
        1.0
    };
    Finding::new(
        status_above(ratio, BUFFER_THIN_WATCH, BUFFER_THIN_CAUTION),
        "The safety margin is thin, so one surprise can break the plan.",
        "Build a larger saving buffer or lower expenses.",
    )
}
