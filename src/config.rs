//! Default household, validation and JSON import/export for `LifeConfig`.
//!
//! The projection engine trusts its input; everything that reaches it from a
//! file, the HTTP API or a stored snapshot passes through `import_config` or
//! `validate` first.

use std::path::Path;

use thiserror::Error;

use crate::core::constants::MAX_HORIZON_YEARS;
use crate::core::{LifeConfig, ScenarioValues};

const MIN_YEAR: i32 = 1900;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be {requirement}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            name: "Hoàng".to_string(),
            spouse_name: "Ngân".to_string(),
            birth_year: 1991,
            start_year: 2026,
            horizon_years: 60,
            fx_vnd_per_usd: 27_000.0,
            start_nw_vnd: 8.49e9,
            net_income_y1: 3.0e9,
            income_growth: 0.06,
            expense_y1: 2.0e9,
            expense_growth: 0.05,
            min_contrib: 0.0,
            max_contrib: None,
            saving_rate_cap: Some(0.6),
            contribute_years: None,
            cagr: ScenarioValues {
                bear: 0.15,
                base: 0.18,
                bull: 0.22,
            },
            income_source: None,
        }
    }
}

fn invalid(field: &'static str, requirement: &'static str) -> ConfigError {
    ConfigError::Invalid { field, requirement }
}

fn check_non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, ">= 0"));
    }
    Ok(())
}

fn check_growth(field: &'static str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value <= -1.0 {
        return Err(invalid(field, "> -100%"));
    }
    Ok(())
}

pub fn validate(config: &LifeConfig) -> ConfigResult<()> {
    if config.birth_year < MIN_YEAR {
        return Err(invalid("birthYear", ">= 1900"));
    }
    if config.start_year < MIN_YEAR {
        return Err(invalid("startYear", ">= 1900"));
    }
    if !(1..=MAX_HORIZON_YEARS).contains(&config.horizon_years) {
        return Err(invalid("horizonYears", "between 1 and 120"));
    }

    if !config.fx_vnd_per_usd.is_finite() || config.fx_vnd_per_usd <= 0.0 {
        return Err(invalid("fxVndPerUsd", "> 0"));
    }

    check_non_negative("startNWVnd", config.start_nw_vnd)?;
    check_non_negative("netIncomeY1", config.net_income_y1)?;
    check_non_negative("expenseY1", config.expense_y1)?;
    check_non_negative("minContrib", config.min_contrib)?;
    check_growth("incomeGrowth", config.income_growth)?;
    check_growth("expenseGrowth", config.expense_growth)?;

    if let Some(max) = config.max_contrib {
        if max.is_nan() || max < 0.0 {
            return Err(invalid("maxContrib", ">= 0 or null"));
        }
        if max < config.min_contrib {
            return Err(invalid("maxContrib", ">= minContrib"));
        }
    }

    if config
        .saving_rate_cap
        .is_some_and(|cap| !(0.0..=1.0).contains(&cap))
    {
        return Err(invalid("savingRateCap", "between 0 and 1"));
    }

    check_growth("cagr.bear", config.cagr.bear)?;
    check_growth("cagr.base", config.cagr.base)?;
    check_growth("cagr.bull", config.cagr.bull)?;

    if let Some(profile) = config
        .income_source
        .as_ref()
        .and_then(|source| source.salary_fast.as_ref())
    {
        check_non_negative("salaryFast.basicGrossMonthlyVnd", profile.basic_gross_monthly_vnd)?;
        check_non_negative(
            "salaryFast.personalDeductionMonthlyVnd",
            profile.personal_deduction_monthly_vnd,
        )?;
        check_non_negative(
            "salaryFast.dependentDeductionMonthlyVnd",
            profile.dependent_deduction_monthly_vnd,
        )?;
        check_non_negative("salaryFast.insuranceAnnualVnd", profile.insurance_annual_vnd)?;
        if !(0.0..=1.0).contains(&profile.effective_tax_rate) {
            return Err(invalid("salaryFast.effectiveTaxRate", "between 0 and 1"));
        }
    }

    Ok(())
}

/// Parses a config, filling fields absent from `json` with the defaults.
pub fn import_config(json: &str) -> ConfigResult<LifeConfig> {
    let config = serde_json::from_str::<LifeConfig>(json)?;
    validate(&config)?;
    Ok(config)
}

pub fn export_config(config: &LifeConfig) -> ConfigResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn load_config_file(path: &Path) -> ConfigResult<LifeConfig> {
    let text = std::fs::read_to_string(path)?;
    import_config(&text)
}
