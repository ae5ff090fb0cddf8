use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Bear,
    Base,
    Bull,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Bear, Scenario::Base, Scenario::Bull];
}

/// One value per growth scenario.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioValues {
    pub bear: f64,
    pub base: f64,
    pub bull: f64,
}

impl ScenarioValues {
    pub fn splat(value: f64) -> Self {
        Self {
            bear: value,
            base: value,
            bull: value,
        }
    }

    pub fn map(self, mut f: impl FnMut(Scenario, f64) -> f64) -> Self {
        Self {
            bear: f(Scenario::Bear, self.bear),
            base: f(Scenario::Base, self.base),
            bull: f(Scenario::Bull, self.bull),
        }
    }
}

impl Index<Scenario> for ScenarioValues {
    type Output = f64;

    fn index(&self, scenario: Scenario) -> &f64 {
        match scenario {
            Scenario::Bear => &self.bear,
            Scenario::Base => &self.base,
            Scenario::Bull => &self.bull,
        }
    }
}

impl IndexMut<Scenario> for ScenarioValues {
    fn index_mut(&mut self, scenario: Scenario) -> &mut f64 {
        match scenario {
            Scenario::Bear => &mut self.bear,
            Scenario::Base => &mut self.base,
            Scenario::Bull => &mut self.bull,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeMode {
    #[default]
    Manual,
    #[serde(alias = "salaryFast", alias = "salary_fast")]
    SalaryFast,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusChange {
    pub effective_year: i32,
    pub multiplier: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxChange {
    pub effective_year: i32,
    pub personal_deduction_monthly_vnd: Option<f64>,
    pub dependent_deduction_monthly_vnd: Option<f64>,
    pub effective_tax_rate: Option<f64>,
    pub insurance_annual_vnd: Option<f64>,
}

/// Salary inputs kept alongside a configuration so a caller can derive
/// `net_income_y1` from them. The projection never reads these fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryFastProfile {
    pub basic_gross_monthly_vnd: f64,
    pub allowances_monthly_vnd: Option<f64>,
    pub months_paid_per_year: Option<f64>,
    pub bonus_dec_multiplier: Option<f64>,
    pub bonus_mar_multiplier: Option<f64>,
    pub bonus_mar_change: Option<BonusChange>,
    pub dependents_count: u32,
    pub personal_deduction_monthly_vnd: f64,
    pub dependent_deduction_monthly_vnd: f64,
    pub insurance_annual_vnd: f64,
    pub effective_tax_rate: f64,
    pub tax_change: Option<TaxChange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    #[serde(default)]
    pub mode: IncomeMode,
    pub salary_fast: Option<SalaryFastProfile>,
}

/// Household plan the projection runs on. Defaults live in `crate::config`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LifeConfig {
    pub name: String,
    pub spouse_name: String,
    pub birth_year: i32,
    pub start_year: i32,
    pub horizon_years: u32,

    pub fx_vnd_per_usd: f64,
    #[serde(rename = "startNWVnd", alias = "startNwVnd")]
    pub start_nw_vnd: f64,

    pub net_income_y1: f64,
    pub income_growth: f64,
    pub expense_y1: f64,
    pub expense_growth: f64,

    pub min_contrib: f64,
    /// `None` (JSON `null`) means no upper bound.
    pub max_contrib: Option<f64>,
    pub saving_rate_cap: Option<f64>,
    pub contribute_years: Option<u32>,

    pub cagr: ScenarioValues,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_source: Option<IncomeSource>,
}

impl LifeConfig {
    /// Upper contribution bound; non-finite values count as unbounded.
    pub fn max_contrib_limit(&self) -> Option<f64> {
        self.max_contrib.filter(|max| max.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub year: i32,
    pub age: i32,
    pub income: f64,
    pub expense: f64,
    pub saving: f64,
    pub contrib: f64,
    pub nw_vnd: ScenarioValues,
    pub nw_usd: ScenarioValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneHit {
    pub threshold_usd: f64,
    pub scenario: Scenario,
    pub year: i32,
    pub age: i32,
    pub nw_usd: f64,
}

/// A grid cell: the first year/age a target was reached. Older snapshots
/// stored the cell as display text or as a year without an age, so both
/// forms are still accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MilestoneCell {
    Reached {
        year: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        age: Option<i32>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneGridRow {
    #[serde(alias = "label")]
    pub target: String,
    pub bear: Option<MilestoneCell>,
    pub base: Option<MilestoneCell>,
    pub bull: Option<MilestoneCell>,
}

impl MilestoneGridRow {
    pub fn cell(&self, scenario: Scenario) -> Option<&MilestoneCell> {
        match scenario {
            Scenario::Bear => self.bear.as_ref(),
            Scenario::Base => self.base.as_ref(),
            Scenario::Bull => self.bull.as_ref(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Ok,
    Watch,
    Caution,
}

impl AlertStatus {
    pub fn rank(self) -> u8 {
        match self {
            AlertStatus::Caution => 2,
            AlertStatus::Watch => 1,
            AlertStatus::Ok => 0,
        }
    }
}

/// The fixed rule battery, in registration order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertId {
    LifestyleInflation,
    CashflowDeficit,
    NoFuel,
    ClampedByMax,
    CappedByRate,
    HighCagr,
    MilestoneSlippage,
    BufferThin,
}

impl AlertId {
    pub const ALL: [AlertId; 8] = [
        AlertId::LifestyleInflation,
        AlertId::CashflowDeficit,
        AlertId::NoFuel,
        AlertId::ClampedByMax,
        AlertId::CappedByRate,
        AlertId::HighCagr,
        AlertId::MilestoneSlippage,
        AlertId::BufferThin,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub title: String,
    pub status: AlertStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub caution: u32,
    pub watch: u32,
    pub ok: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDigest {
    pub worst: AlertStatus,
    pub counts: AlertCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EndNetWorth {
    pub vnd: ScenarioValues,
    pub usd: ScenarioValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub end: EndNetWorth,
    pub milestones: Vec<MilestoneGridRow>,
    pub alerts: AlertDigest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub name: String,
    pub config: LifeConfig,
    pub summary: SnapshotSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneComparison {
    pub target: String,
    pub a: String,
    pub b: String,
    pub delta_years: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub a_id: String,
    pub b_id: String,
    pub a_name: String,
    pub b_name: String,
    pub a_base_usd: f64,
    pub b_base_usd: f64,
    pub delta_base_usd: f64,
    pub milestones: Vec<MilestoneComparison>,
    pub a_alerts: AlertCounts,
    pub b_alerts: AlertCounts,
}
