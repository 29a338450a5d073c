//! # Settings
//!
//! The store keeps settings as flat `key → string` rows. This module is the
//! typed view over those rows: parse a snapshot out of them, and turn a
//! partial update back into validated rows.
//!
//! ```text
//! settings table                      Settings (snapshot)
//! ┌────────────────┬──────────┐       ┌──────────────────────────┐
//! │ language       │ ar       │ ────► │ language: "ar"           │
//! │ currency       │ SAR      │       │ currency: "SAR"          │
//! │ tax_rate       │ 15       │       │ tax_rate: 1500 bps       │
//! │ company_name   │ …        │       │ company_name, footer     │
//! │ theme          │ light    │       │ theme: Light             │
//! └────────────────┴──────────┘       └──────────────────────────┘
//!                ▲
//!                └──── SettingsPatch::to_pairs (only provided keys)
//! ```
//!
//! Consumers receive a snapshot explicitly; nothing here is global.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;
use crate::validation::ValidationResult;

pub const KEY_LANGUAGE: &str = "language";
pub const KEY_CURRENCY: &str = "currency";
pub const KEY_TAX_RATE: &str = "tax_rate";
pub const KEY_COMPANY_NAME: &str = "company_name";
pub const KEY_RECEIPT_FOOTER: &str = "receipt_footer";
pub const KEY_THEME: &str = "theme";

/// UI languages the front end ships translations for.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["ar", "en"];

// =============================================================================
// Theme
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ValidationError::NotAllowed {
                field: KEY_THEME.to_string(),
                allowed: vec!["light".to_string(), "dark".to_string()],
            }),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A typed snapshot of the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Settings {
    pub language: String,
    pub currency: String,
    /// Flat sales tax applied to every sale.
    pub tax_rate: TaxRate,
    pub company_name: String,
    pub receipt_footer: String,
    pub theme: Theme,
}

impl Default for Settings {
    /// Same values the initial migration seeds.
    fn default() -> Self {
        Settings {
            language: "ar".to_string(),
            currency: "SAR".to_string(),
            tax_rate: TaxRate::from_bps(1_500),
            company_name: "POS System".to_string(),
            receipt_footer: "شكراً لزيارتكم - Thank you for your visit".to_string(),
            theme: Theme::Light,
        }
    }
}

impl Settings {
    /// Builds a snapshot from raw rows.
    ///
    /// Missing keys fall back to their defaults. A key that is present but
    /// malformed is an error; the caller decides whether to fall back.
    pub fn from_map(rows: &HashMap<String, String>) -> ValidationResult<Settings> {
        let mut settings = Settings::default();

        if let Some(v) = rows.get(KEY_LANGUAGE) {
            settings.language = parse_language(v)?;
        }
        if let Some(v) = rows.get(KEY_CURRENCY) {
            settings.currency = parse_currency(v)?;
        }
        if let Some(v) = rows.get(KEY_TAX_RATE) {
            settings.tax_rate = TaxRate::parse_percent(v)?;
        }
        if let Some(v) = rows.get(KEY_COMPANY_NAME) {
            settings.company_name = v.clone();
        }
        if let Some(v) = rows.get(KEY_RECEIPT_FOOTER) {
            settings.receipt_footer = v.clone();
        }
        if let Some(v) = rows.get(KEY_THEME) {
            settings.theme = v.parse()?;
        }

        Ok(settings)
    }
}

fn parse_language(v: &str) -> ValidationResult<String> {
    let v = v.trim();
    if SUPPORTED_LANGUAGES.contains(&v) {
        Ok(v.to_string())
    } else {
        Err(ValidationError::NotAllowed {
            field: KEY_LANGUAGE.to_string(),
            allowed: SUPPORTED_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// ISO 4217 style: three ASCII letters.
fn parse_currency(v: &str) -> ValidationResult<String> {
    let v = v.trim();
    if v.len() == 3 && v.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(v.to_ascii_uppercase())
    } else {
        Err(ValidationError::invalid_format(
            KEY_CURRENCY,
            "expected a three-letter currency code",
        ))
    }
}

// =============================================================================
// Partial Update
// =============================================================================

/// A partial settings update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SettingsPatch {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Percentage string, as stored (`"15"`, `"7.5"`).
    #[serde(default)]
    pub tax_rate: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub receipt_footer: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }

    /// Validates every provided field and returns the normalized rows to
    /// upsert. Nothing is returned if any field is invalid.
    pub fn to_pairs(&self) -> ValidationResult<Vec<(&'static str, String)>> {
        let mut pairs = Vec::new();

        if let Some(v) = &self.language {
            pairs.push((KEY_LANGUAGE, parse_language(v)?));
        }
        if let Some(v) = &self.currency {
            pairs.push((KEY_CURRENCY, parse_currency(v)?));
        }
        if let Some(v) = &self.tax_rate {
            pairs.push((KEY_TAX_RATE, TaxRate::parse_percent(v)?.to_string()));
        }
        if let Some(v) = &self.company_name {
            if v.trim().is_empty() {
                return Err(ValidationError::required(KEY_COMPANY_NAME));
            }
            pairs.push((KEY_COMPANY_NAME, v.trim().to_string()));
        }
        if let Some(v) = &self.receipt_footer {
            pairs.push((KEY_RECEIPT_FOOTER, v.clone()));
        }
        if let Some(theme) = self.theme {
            pairs.push((KEY_THEME, theme.as_str().to_string()));
        }

        Ok(pairs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
