// src/common/month.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Mês de calendário de uma auditoria, serializado como `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("mês inválido: '{s}' (esperado YYYY-MM)"))?;

        let year: i32 = year.parse().map_err(|_| format!("ano inválido em '{s}'"))?;
        let month: u32 = month.parse().map_err(|_| format!("mês inválido em '{s}'"))?;

        MonthKey::new(year, month).ok_or_else(|| format!("mês fora do intervalo em '{s}'"))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_key_from_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        let key = MonthKey::of(instant);
        assert_eq!(key.to_string(), "2026-03");
        assert_eq!(key.year(), 2026);
    }

    #[test]
    fn test_month_key_parse() {
        assert_eq!("2025-11".parse::<MonthKey>().unwrap(), MonthKey::new(2025, 11).unwrap());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("2025".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_ordering_crosses_years() {
        let december = MonthKey::new(2025, 12).unwrap();
        let january = MonthKey::new(2026, 1).unwrap();
        assert!(december < january);
    }

    #[test]
    fn test_month_key_serde_as_string() {
        let key = MonthKey::new(2026, 7).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2026-07\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"2026-00\"").is_err());
    }
}
