use serde::{Deserialize, Serialize};

use crate::calculator::RateTable;
use crate::errors::{LoanError, Result};

/// product configuration for the loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanProductConfig {
    pub rate_table: RateTable,
    /// decimal places used when persisting money values
    pub currency_decimal_places: u32,
    pub dashboard: DashboardConfig,
}

/// dashboard limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub recent_payments_limit: usize,
    pub top_debtors_limit: usize,
    /// maturities within this many days are flagged as upcoming
    pub maturity_alert_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_payments_limit: 10,
            top_debtors_limit: 10,
            maturity_alert_days: 7,
        }
    }
}

impl Default for LoanProductConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LoanProductConfig {
    /// standard microcredit product: 1 to 6 months, flat table rates
    pub fn standard() -> Self {
        Self {
            rate_table: RateTable::standard(),
            currency_decimal_places: 2,
            dashboard: DashboardConfig::default(),
        }
    }

    /// single-bullet product repaid in one month
    pub fn one_month_bullet() -> Self {
        Self {
            rate_table: RateTable::standard().restricted_to(&[1]),
            ..Self::standard()
        }
    }

    /// load from a JSON document; missing fields take standard values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.rate_table.validate()?;

        if self.currency_decimal_places > 8 {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "currency_decimal_places must be at most 8, got {}",
                    self.currency_decimal_places
                ),
            });
        }
        if self.dashboard.recent_payments_limit == 0 || self.dashboard.top_debtors_limit == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "dashboard limits must be positive".to_string(),
            });
        }
        if self.dashboard.maturity_alert_days < 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "maturity_alert_days must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
