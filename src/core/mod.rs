pub mod alerts;
pub mod constants;
mod engine;
pub mod milestones;
pub mod snapshots;
mod types;

pub use alerts::{AlertContext, compute_alerts, digest_alerts};
pub use engine::{compute_contribution, compute_saving, project};
pub use milestones::{build_milestone_grid, find_milestones, next_milestone_base};
pub use snapshots::{alert_context, compare, create_snapshot, summarize};
pub use types::{
    Alert, AlertCounts, AlertDigest, AlertId, AlertStatus, BonusChange, Comparison, EndNetWorth,
    IncomeMode, IncomeSource, LifeConfig, MilestoneCell, MilestoneComparison, MilestoneGridRow,
    MilestoneHit, ProjectionRow, SalaryFastProfile, Scenario, ScenarioValues, Snapshot,
    SnapshotSummary, TaxChange,
};
