//! Issue reports and mutation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{Coordinates, ZoneId};

/// Lifecycle status of an issue report.
///
/// Reports are created as [`ReportStatus::Pending`]; later transitions
/// happen server-side.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    /// Submitted, not yet reviewed.
    #[default]
    Pending,
    /// Under review.
    Reviewing,
    /// Resolved.
    Resolved,
}

/// A user-submitted issue about a safe zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    /// Locally generated report id.
    pub id: String,
    /// The zone the issue concerns.
    pub zone_id: ZoneId,
    /// Issue category (e.g. `"Overcrowded"`).
    pub issue_type: String,
    /// Free-text description.
    pub description: String,
    /// Where the user was when reporting, if known.
    #[serde(default)]
    pub user_location: Option<Coordinates>,
    /// When the report was created.
    pub timestamp: DateTime<Utc>,
    /// Report status.
    #[serde(default)]
    pub status: ReportStatus,
}

/// Outcome of an issue report submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    /// Whether both the remote submission and the local append succeeded.
    pub success: bool,
    /// Id of the stored report, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    /// Failure message, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportResult {
    /// A successful submission.
    #[must_use]
    pub fn submitted(report_id: impl Into<String>) -> Self {
        Self {
            success: true,
            report_id: Some(report_id.into()),
            error: None,
        }
    }

    /// A failed submission.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            report_id: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a favorites mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    /// Whether the mutation was persisted.
    pub success: bool,
    /// Failure message, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResult {
    /// A persisted mutation.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed mutation.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
