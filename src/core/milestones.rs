use std::sync::LazyLock;

use regex::Regex;

use super::constants::{MILESTONE_TARGETS, MILESTONE_THRESHOLDS};
use super::types::{MilestoneCell, MilestoneGridRow, MilestoneHit, ProjectionRow, Scenario};

/// Display text for a target a scenario never reaches.
pub const NOT_REACHED: &str = "—";

static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year pattern"));

/// First row at which each scenario's USD net worth reaches each threshold.
///
/// Pairs that are never reached are left out. Hits are grouped by scenario
/// (bear, base, bull) with thresholds ascending inside each group.
pub fn find_milestones(rows: &[ProjectionRow]) -> Vec<MilestoneHit> {
    let mut hits = Vec::new();
    for scenario in Scenario::ALL {
        for threshold in MILESTONE_THRESHOLDS {
            if let Some(row) = rows.iter().find(|r| r.nw_usd[scenario] >= threshold) {
                hits.push(MilestoneHit {
                    threshold_usd: threshold,
                    scenario,
                    year: row.year,
                    age: row.age,
                    nw_usd: row.nw_usd[scenario],
                });
            }
        }
    }
    hits
}

pub fn build_milestone_grid(hits: &[MilestoneHit]) -> Vec<MilestoneGridRow> {
    let cell = |scenario: Scenario, threshold: f64| {
        hits.iter()
            .find(|h| h.scenario == scenario && h.threshold_usd == threshold)
            .map(|h| MilestoneCell::Reached {
                year: h.year,
                age: Some(h.age),
            })
    };

    MILESTONE_TARGETS
        .iter()
        .map(|&(usd, label)| MilestoneGridRow {
            target: label.to_string(),
            bear: cell(Scenario::Bear, usd),
            base: cell(Scenario::Base, usd),
            bull: cell(Scenario::Bull, usd),
        })
        .collect()
}

/// Smallest base-scenario milestone that was reached, if any.
pub fn next_milestone_base(hits: &[MilestoneHit]) -> Option<MilestoneHit> {
    hits.iter()
        .filter(|h| h.scenario == Scenario::Base)
        .min_by(|a, b| a.threshold_usd.total_cmp(&b.threshold_usd))
        .copied()
}

impl MilestoneCell {
    pub fn text(&self) -> String {
        match self {
            MilestoneCell::Reached {
                year,
                age: Some(age),
            } => format!("{year} (age {age})"),
            MilestoneCell::Reached { year, age: None } => year.to_string(),
            MilestoneCell::Text(text) => text.clone(),
        }
    }

    /// Calendar year of the hit; legacy text cells are scanned for a year.
    pub fn year(&self) -> Option<i32> {
        match self {
            MilestoneCell::Reached { year, .. } => Some(*year),
            MilestoneCell::Text(text) => YEAR_TOKEN
                .find(text)
                .and_then(|m| m.as_str().parse().ok()),
        }
    }
}

pub fn cell_text(cell: Option<&MilestoneCell>) -> String {
    cell.map_or_else(|| NOT_REACHED.to_string(), MilestoneCell::text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use crate::core::types::{LifeConfig, ScenarioValues};
    use proptest::prelude::{prop_assert, proptest};

    fn row(year: i32, usd: ScenarioValues) -> ProjectionRow {
        ProjectionRow {
            year,
            age: year - 1991,
            income: 0.0,
            expense: 0.0,
            saving: 0.0,
            contrib: 0.0,
            nw_vnd: usd,
            nw_usd: usd,
        }
    }

    fn single_year_config() -> LifeConfig {
        LifeConfig {
            name: "A".to_string(),
            spouse_name: "B".to_string(),
            birth_year: 1991,
            start_year: 2026,
            horizon_years: 1,
            fx_vnd_per_usd: 1.0,
            start_nw_vnd: 900_000.0,
            net_income_y1: 0.0,
            income_growth: 0.0,
            expense_y1: 0.0,
            expense_growth: 0.0,
            min_contrib: 0.0,
            max_contrib: None,
            saving_rate_cap: None,
            contribute_years: None,
            cagr: ScenarioValues::splat(0.20),
            income_source: None,
        }
    }

    #[test]
    fn milestone_is_hit_at_end_of_first_year() {
        let rows = project(&single_year_config());
        let hits = find_milestones(&rows);

        let base = hits
            .iter()
            .find(|h| h.scenario == Scenario::Base && h.threshold_usd == 1e6)
            .expect("base $1M should be reached");
        assert_eq!(base.year, 2026);
        assert_eq!(base.age, 35);
        assert!((base.nw_usd - 1_080_000.0).abs() < 1e-6);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn unreached_pairs_are_omitted() {
        let rows = vec![
            row(2026, ScenarioValues { bear: 5e5, base: 2e6, bull: 2e7 }),
            row(2027, ScenarioValues { bear: 9e5, base: 3e6, bull: 2e8 }),
        ];
        let hits = find_milestones(&rows);

        assert!(hits.iter().all(|h| h.scenario != Scenario::Bear));
        assert_eq!(
            hits.iter().filter(|h| h.scenario == Scenario::Base).count(),
            1
        );
        let bull_100m = hits
            .iter()
            .find(|h| h.scenario == Scenario::Bull && h.threshold_usd == 1e8)
            .expect("bull $100M reached");
        assert_eq!(bull_100m.year, 2027);
        assert!(find_milestones(&[]).is_empty());
    }

    #[test]
    fn grid_has_one_row_per_target_with_gaps_as_none() {
        let rows = vec![row(2030, ScenarioValues { bear: 0.0, base: 1e6, bull: 1e7 })];
        let grid = build_milestone_grid(&find_milestones(&rows));

        assert_eq!(
            grid.iter().map(|r| r.target.as_str()).collect::<Vec<_>>(),
            vec!["$1M", "$10M", "$100M", "$1B"]
        );
        assert_eq!(grid[0].bear, None);
        assert_eq!(
            grid[0].base,
            Some(MilestoneCell::Reached {
                year: 2030,
                age: Some(39),
            })
        );
        assert_eq!(grid[1].base, None);
        assert!(grid[1].bull.is_some());
        assert!(grid[3].cell(Scenario::Bull).is_none());
    }

    #[test]
    fn next_base_milestone_is_smallest_threshold() {
        let rows = vec![
            row(2026, ScenarioValues::splat(5e5)),
            row(2027, ScenarioValues::splat(2e6)),
            row(2028, ScenarioValues::splat(2e7)),
        ];
        let hits = find_milestones(&rows);
        let next = next_milestone_base(&hits).expect("base hit");
        assert_eq!(next.threshold_usd, 1e6);
        assert_eq!(next.year, 2027);
        assert_eq!(next_milestone_base(&[]), None);
    }

    #[test]
    fn cell_text_and_year_handle_legacy_strings() {
        let reached = MilestoneCell::Reached {
            year: 2030,
            age: Some(39),
        };
        assert_eq!(reached.text(), "2030 (age 39)");
        assert_eq!(reached.year(), Some(2030));

        let legacy = MilestoneCell::Text("2041 (age 50)".to_string());
        assert_eq!(legacy.year(), Some(2041));
        assert_eq!(MilestoneCell::Text("soon".to_string()).year(), None);
        assert_eq!(MilestoneCell::Text("12030".to_string()).year(), None);

        assert_eq!(cell_text(None), NOT_REACHED);
        assert_eq!(cell_text(Some(&reached)), "2030 (age 39)");
    }

    #[test]
    fn grid_cells_deserialize_from_object_or_text() {
        let json = r#"{
          "target": "$1M",
          "bear": null,
          "base": {"year": 2030, "age": 39},
          "bull": "2029 (age 38)"
        }"#;
        let parsed: MilestoneGridRow = serde_json::from_str(json).expect("grid row parses");
        assert_eq!(parsed.bear, None);
        assert_eq!(
            parsed.base,
            Some(MilestoneCell::Reached {
                year: 2030,
                age: Some(39),
            })
        );
        assert_eq!(
            parsed.bull,
            Some(MilestoneCell::Text("2029 (age 38)".to_string()))
        );
    }

    #[test]
    fn year_only_cells_parse_and_render_without_age() {
        let json = r#"{"label": "$10M", "bear": null, "base": {"year": 2030}, "bull": null}"#;
        let parsed: MilestoneGridRow = serde_json::from_str(json).expect("year-only cell parses");
        let cell = parsed.base.expect("base cell present");
        assert_eq!(cell, MilestoneCell::Reached { year: 2030, age: None });
        assert_eq!(cell.text(), "2030");
        assert_eq!(cell.year(), Some(2030));

        let written = serde_json::to_string(&cell).expect("serializes");
        assert_eq!(written, r#"{"year":2030}"#);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_dominating_scenario_reaches_milestones_no_later(
            start_usd in 0u64..2_000_000,
            low_bp in -1000i32..2000,
            spread_bp in 0i32..2000,
            contrib in 0u64..500_000,
            horizon in 1u32..100
        ) {
            let mut config = single_year_config();
            config.horizon_years = horizon;
            config.start_nw_vnd = start_usd as f64;
            config.net_income_y1 = contrib as f64;
            let low = low_bp as f64 / 10_000.0;
            let high = (low_bp + spread_bp) as f64 / 10_000.0;
            config.cagr = ScenarioValues { bear: low, base: high, bull: high };

            let hits = find_milestones(&project(&config));
            for threshold in MILESTONE_THRESHOLDS {
                let hit = |scenario: Scenario| {
                    hits.iter()
                        .find(|h| h.scenario == scenario && h.threshold_usd == threshold)
                };
                let bear = hit(Scenario::Bear);
                let base = hit(Scenario::Base);
                if let Some(bear) = bear {
                    let base = base.expect("dominating scenario must also reach the threshold");
                    prop_assert!(base.year <= bear.year);
                }
            }
        }
    }
}
