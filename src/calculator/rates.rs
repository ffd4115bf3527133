use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};

/// business rate table: duration in months -> flat interest fraction
const STANDARD_RATES: [(u32, Decimal); 6] = [
    (1, dec!(0.09)),
    (2, dec!(0.19)),
    (3, dec!(0.30)),
    (4, dec!(0.41)),
    (5, dec!(0.54)),
    (6, dec!(0.68)),
];

/// look up the flat rate for a duration in the standard table
pub fn lookup_rate(months: u32) -> Result<Rate> {
    STANDARD_RATES
        .iter()
        .find(|(m, _)| *m == months)
        .map(|(_, rate)| Rate::from_decimal(*rate))
        .ok_or_else(|| LoanError::UnsupportedDuration {
            months,
            supported: describe_durations(STANDARD_RATES.iter().map(|(m, _)| *m)),
        })
}

/// duration -> rate mapping carried by a product configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<u32, Rate>,
}

impl RateTable {
    /// the standard business table (1..=6 months)
    pub fn standard() -> Self {
        Self {
            rates: STANDARD_RATES
                .iter()
                .map(|(m, r)| (*m, Rate::from_decimal(*r)))
                .collect(),
        }
    }

    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, Rate)>,
    {
        let table = Self {
            rates: entries.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rates.is_empty() {
            return Err(LoanError::InvalidConfiguration {
                message: "rate table is empty".to_string(),
            });
        }
        if self.rates.contains_key(&0) {
            return Err(LoanError::InvalidConfiguration {
                message: "rate table contains a zero-month duration".to_string(),
            });
        }
        if let Some(rate) = self.rates.values().find(|r| r.is_negative()) {
            return Err(LoanError::InvalidInterestRate { rate: *rate });
        }
        Ok(())
    }

    pub fn lookup(&self, months: u32) -> Result<Rate> {
        self.rates
            .get(&months)
            .copied()
            .ok_or_else(|| LoanError::UnsupportedDuration {
                months,
                supported: describe_durations(self.rates.keys().copied()),
            })
    }

    /// keep only the listed durations
    pub fn restricted_to(&self, months: &[u32]) -> Self {
        Self {
            rates: self
                .rates
                .iter()
                .filter(|(m, _)| months.contains(m))
                .map(|(m, r)| (*m, *r))
                .collect(),
        }
    }

    pub fn supports(&self, months: u32) -> bool {
        self.rates.contains_key(&months)
    }

    pub fn durations(&self) -> impl Iterator<Item = u32> + '_ {
        self.rates.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Rate)> + '_ {
        self.rates.iter().map(|(m, r)| (*m, *r))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// "1-6" for a contiguous range, "1, 3, 6" otherwise
fn describe_durations<I: Iterator<Item = u32>>(durations: I) -> String {
    let durations: Vec<u32> = durations.collect();
    match (durations.first(), durations.last()) {
        (Some(first), Some(last))
            if durations.windows(2).all(|w| w[1] == w[0] + 1) && first != last =>
        {
            format!("{}-{}", first, last)
        }
        _ => durations
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rates() {
        let expected = [
            (1, dec!(0.09)),
            (2, dec!(0.19)),
            (3, dec!(0.30)),
            (4, dec!(0.41)),
            (5, dec!(0.54)),
            (6, dec!(0.68)),
        ];
        for (months, rate) in expected {
            assert_eq!(lookup_rate(months).unwrap().as_decimal(), rate);
            assert_eq!(RateTable::standard().lookup(months).unwrap().as_decimal(), rate);
        }
    }

    #[test]
    fn test_unsupported_durations_fail() {
        for months in [0, 7, 12, 24, u32::MAX] {
            match lookup_rate(months) {
                Err(LoanError::UnsupportedDuration { months: m, supported }) => {
                    assert_eq!(m, months);
                    assert_eq!(supported, "1-6");
                }
                other => panic!("expected unsupported duration, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_custom_table() {
        let table = RateTable::from_entries([
            (1, Rate::from_percentage(10)),
            (3, Rate::from_percentage(25)),
        ])
        .unwrap();

        assert!(table.supports(3));
        assert!(!table.supports(2));
        match table.lookup(2) {
            Err(LoanError::UnsupportedDuration { supported, .. }) => assert_eq!(supported, "1, 3"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert!(RateTable::from_entries(Vec::<(u32, Rate)>::new()).is_err());
        assert!(RateTable::standard().restricted_to(&[9]).validate().is_err());
        assert!(RateTable::from_entries([(0, Rate::from_percentage(5))]).is_err());
        assert!(RateTable::from_entries([(1, Rate::from_decimal(dec!(-0.01)))]).is_err());
    }
}
