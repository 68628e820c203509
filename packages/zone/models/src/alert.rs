//! Climate alert types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::RecordId;

/// Severity of a climate alert.
///
/// Parsing is case-insensitive and never fails: anything unrecognised
/// becomes [`AlertSeverity::Unknown`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Requires attention.
    Moderate,
    /// Requires immediate action.
    High,
    /// Severity text the app does not recognise.
    #[default]
    Unknown,
}

impl From<String> for AlertSeverity {
    fn from(label: String) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

impl From<AlertSeverity> for String {
    fn from(severity: AlertSeverity) -> Self {
        severity.to_string()
    }
}

/// A climate alert covering one or more districts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateAlert {
    /// Alert identifier.
    pub id: RecordId,
    /// Alert type (e.g. `"Flood Warning"`).
    #[serde(rename = "type", default)]
    pub alert_type: String,
    /// Alert severity.
    #[serde(default)]
    pub severity: AlertSeverity,
    /// Alert body text.
    #[serde(default)]
    pub text: String,
    /// When the alert was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Districts covered by the alert.
    #[serde(default)]
    pub affected_areas: Vec<String>,
    /// Names of safe zones recommended for this alert.
    #[serde(default)]
    pub safe_zones: Vec<String>,
    /// Expected duration (e.g. `"24 hours"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Recommended actions.
    #[serde(default)]
    pub recommendations: Vec<String>,
}
