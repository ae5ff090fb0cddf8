/// Net worth thresholds in USD, checked per scenario in ascending order.
pub const MILESTONE_THRESHOLDS: [f64; 4] = [1e6, 1e7, 1e8, 1e9];

/// Display label for each entry of `MILESTONE_THRESHOLDS`.
pub const MILESTONE_TARGETS: [(f64, &str); 4] = [
    (1e6, "$1M"),
    (1e7, "$10M"),
    (1e8, "$100M"),
    (1e9, "$1B"),
];

// expense growth minus income growth
pub const LIFESTYLE_INFLATION_WATCH: f64 = 0.005;
pub const LIFESTYLE_INFLATION_CAUTION: f64 = 0.02;

// longest run of consecutive zero-saving years
pub const NO_FUEL_WATCH_STREAK: usize = 2;
pub const NO_FUEL_CAUTION_STREAK: usize = 5;

// share of years in the analysis window where a cap binds
pub const CONTRIB_CAP_WATCH_RATE: f64 = 0.3;
pub const CONTRIB_CAP_CAUTION_RATE: f64 = 0.6;

// base-scenario CAGR, strict comparison
pub const HIGH_CAGR_WATCH: f64 = 0.25;
pub const HIGH_CAGR_CAUTION: f64 = 0.30;

// years of delay against the latest snapshot
pub const MILESTONE_SLIPPAGE_WATCH: i32 = 1;
pub const MILESTONE_SLIPPAGE_CAUTION: i32 = 3;

// year-1 expense / net income, strict comparison
pub const BUFFER_THIN_WATCH: f64 = 0.70;
pub const BUFFER_THIN_CAUTION: f64 = 0.85;

/// Number of leading projection years inspected by the rate-based alerts.
pub const ALERT_ANALYSIS_WINDOW_YEARS: usize = 10;

/// Longest horizon accepted by config validation.
pub const MAX_HORIZON_YEARS: u32 = 120;

/// Snapshots retained by the store, newest first.
pub const MAX_SNAPSHOTS: usize = 200;
