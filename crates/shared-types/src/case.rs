use chrono::{DateTime, NaiveDateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::user::Role;

// ── Constants ───────────────────────────────────────────────────────

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_REJECTED: &str = "Rejected";
pub const STATUS_VERIFIED: &str = "Verified";

/// Accepted shape of `filed_date` on intake, e.g. `Mon, 03 Mar 2025 10:00:00 GMT`.
pub const FILED_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

/// Timestamp shape used on every read path.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const UTC_ZONE_NAMES: &[&str] = &["UTC", "GMT", "UT", "Z"];

/// Parse an intake `filed_date`.
///
/// chrono cannot parse `%Z`, so the trailing zone name is split off and must
/// name UTC. The weekday must be a weekday name but need not agree with the
/// date; the date itself comes from the remaining fields.
pub fn parse_filed_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    let mismatch = || format!("filed_date '{raw}' does not match {FILED_DATE_FORMAT}");
    let (stamp, zone) = raw.rsplit_once(' ').ok_or_else(mismatch)?;
    if !UTC_ZONE_NAMES.contains(&zone) {
        return Err(format!("filed_date zone '{zone}' is not UTC"));
    }
    let (weekday, stamp) = stamp.split_once(", ").ok_or_else(mismatch)?;
    if weekday.len() != 3 || weekday.parse::<Weekday>().is_err() {
        return Err(format!("filed_date weekday '{weekday}' is not a day name"));
    }
    NaiveDateTime::parse_from_str(stamp, "%d %b %Y %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("{}: {e}", mismatch()))
}

// ── Stages ──────────────────────────────────────────────────────────

/// Review stage a case can be assigned at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Registrar,
    StampReporter,
    BenchClerk,
    Judge,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Registrar,
        Stage::StampReporter,
        Stage::BenchClerk,
        Stage::Judge,
    ];

    /// Role whose pool serves this stage.
    pub fn role(&self) -> Role {
        match self {
            Stage::Registrar => Role::Registrar,
            Stage::StampReporter => Role::StampReporter,
            Stage::BenchClerk => Role::BenchClerk,
            Stage::Judge => Role::Judge,
        }
    }

    /// Name of the assignment pointer on the case document.
    pub fn field(&self) -> &'static str {
        match self {
            Stage::Registrar => "assigned_registrar",
            Stage::StampReporter => "assigned_stamp_reporter",
            Stage::BenchClerk => "assigned_bench_clerk",
            Stage::Judge => "judge_registrar",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role().as_str())
    }
}

// ── Case document ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Rejection {
    pub status: bool,
    pub reason: String,
}

/// A filed case as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub uid_party1: String,
    pub uid_party2: String,
    pub filed_date: DateTime<Utc>,
    pub associated_lawyers: String,
    pub associated_judge: String,
    pub case_subject: String,
    pub latest_update: String,
    pub client: String,
    pub case_type: String,
    pub description: String,
    /// `Pending`, `Rejected`, `Verified` or free decision text.
    pub status: String,
    pub approved: bool,
    #[serde(default)]
    pub rejected: Rejection,
    #[serde(default)]
    pub decision_reason: Option<String>,
    #[serde(default)]
    pub file_cids: Vec<String>,
    #[serde(default)]
    pub assigned_registrar: Option<Uuid>,
    #[serde(default)]
    pub assigned_stamp_reporter: Option<Uuid>,
    #[serde(default)]
    pub assigned_bench_clerk: Option<Uuid>,
    #[serde(default)]
    pub judge_registrar: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Single-document mutation of a case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseUpdate {
    AttachFiles(Vec<String>),
    /// Record a stage assignee. Ignored if the stage already has one.
    Assign(Stage, Uuid),
    Reject(String),
    Verify,
    Decide { decision: String, reason: String },
}

impl Case {
    /// Build a fresh `Pending` case from validated intake.
    pub fn from_intake(id: Uuid, intake: &CaseIntake, filed_date: DateTime<Utc>) -> Result<Self, String> {
        let lawyer_id = Uuid::parse_str(intake.user_id.trim())
            .map_err(|_| format!("user_id '{}' is not a valid id", intake.user_id))?;
        Ok(Self {
            id,
            lawyer_id,
            uid_party1: intake.uid_party1.clone(),
            uid_party2: intake.uid_party2.clone(),
            filed_date,
            associated_lawyers: intake.associated_lawyers.clone(),
            associated_judge: intake.associated_judge.clone(),
            case_subject: intake.case_subject.clone(),
            latest_update: intake.latest_update.clone(),
            client: intake.client.clone(),
            case_type: intake.case_type.clone(),
            description: intake.description.clone(),
            status: STATUS_PENDING.to_string(),
            approved: false,
            rejected: Rejection::default(),
            decision_reason: None,
            file_cids: Vec::new(),
            assigned_registrar: None,
            assigned_stamp_reporter: None,
            assigned_bench_clerk: None,
            judge_registrar: None,
            created_at: Utc::now(),
        })
    }

    pub fn assignee(&self, stage: Stage) -> Option<Uuid> {
        match stage {
            Stage::Registrar => self.assigned_registrar,
            Stage::StampReporter => self.assigned_stamp_reporter,
            Stage::BenchClerk => self.assigned_bench_clerk,
            Stage::Judge => self.judge_registrar,
        }
    }

    fn assignee_mut(&mut self, stage: Stage) -> &mut Option<Uuid> {
        match stage {
            Stage::Registrar => &mut self.assigned_registrar,
            Stage::StampReporter => &mut self.assigned_stamp_reporter,
            Stage::BenchClerk => &mut self.assigned_bench_clerk,
            Stage::Judge => &mut self.judge_registrar,
        }
    }

    /// Apply a mutation. Returns `true` when the document changed.
    pub fn apply(&mut self, update: &CaseUpdate) -> bool {
        match update {
            CaseUpdate::AttachFiles(cids) => {
                let before = self.file_cids.len();
                for cid in cids {
                    if !self.file_cids.contains(cid) {
                        self.file_cids.push(cid.clone());
                    }
                }
                self.file_cids.len() != before
            }
            CaseUpdate::Assign(stage, reviewer) => {
                let slot = self.assignee_mut(*stage);
                if slot.is_some() {
                    return false;
                }
                *slot = Some(*reviewer);
                true
            }
            CaseUpdate::Reject(reason) => {
                let next = Rejection {
                    status: true,
                    reason: reason.clone(),
                };
                let changed = self.status != STATUS_REJECTED || self.rejected != next;
                self.status = STATUS_REJECTED.to_string();
                self.rejected = next;
                changed
            }
            CaseUpdate::Verify => {
                let changed = self.status != STATUS_VERIFIED || !self.approved;
                self.status = STATUS_VERIFIED.to_string();
                self.approved = true;
                changed
            }
            CaseUpdate::Decide { decision, reason } => {
                let changed =
                    self.status != *decision || self.decision_reason.as_deref() != Some(reason);
                self.status = decision.clone();
                self.decision_reason = Some(reason.clone());
                changed
            }
        }
    }
}

// ── Request Types ───────────────────────────────────────────────────

/// Text fields of the multipart `/submit-case` form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct CaseIntake {
    #[serde(default)]
    pub uid_party1: String,
    #[serde(default)]
    pub uid_party2: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "filed_date is required"))
    )]
    pub filed_date: String,
    #[serde(default)]
    pub associated_lawyers: String,
    #[serde(default)]
    pub associated_judge: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "case_subject is required"))
    )]
    pub case_subject: String,
    #[serde(default)]
    pub latest_update: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "user_id is required"))
    )]
    pub user_id: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub description: String,
}

impl CaseIntake {
    /// Set a text field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "uid_party1" => &mut self.uid_party1,
            "uid_party2" => &mut self.uid_party2,
            "filed_date" => &mut self.filed_date,
            "associated_lawyers" => &mut self.associated_lawyers,
            "associated_judge" => &mut self.associated_judge,
            "case_subject" => &mut self.case_subject,
            "latest_update" => &mut self.latest_update,
            "user_id" => &mut self.user_id,
            "client" => &mut self.client,
            "case_type" => &mut self.case_type,
            "description" => &mut self.description,
            _ => return,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct RejectCaseRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Reason for rejection is required"))
    )]
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct AcceptCaseRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Digital signature is required"))
    )]
    #[serde(default)]
    pub digital_signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct DecisionRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Decision is required"))
    )]
    #[serde(default)]
    pub decision: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Reason is required"))
    )]
    #[serde(default)]
    pub reason: String,
}

/// POST /case-stamp-verif/{case_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StampQueueLookupRequest {
    pub user_id: String,
}

// ── API Response ────────────────────────────────────────────────────

/// Read projection: ids as plain strings, timestamps in display format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseResponse {
    pub id: String,
    pub user_id: String,
    pub uid_party1: String,
    pub uid_party2: String,
    pub filed_date: String,
    pub associated_lawyers: String,
    pub associated_judge: String,
    pub case_subject: String,
    pub latest_update: String,
    pub client: String,
    pub case_type: String,
    pub description: String,
    pub status: String,
    pub approved: bool,
    pub rejected: Rejection,
    pub decision_reason: Option<String>,
    pub file_cids: Vec<String>,
    pub assigned_registrar: Option<String>,
    pub assigned_stamp_reporter: Option<String>,
    pub assigned_bench_clerk: Option<String>,
    pub judge_registrar: Option<String>,
    pub created_at: String,
}

impl From<&Case> for CaseResponse {
    fn from(c: &Case) -> Self {
        let id_str = |id: Option<Uuid>| id.map(|u| u.to_string());
        Self {
            id: c.id.to_string(),
            user_id: c.lawyer_id.to_string(),
            uid_party1: c.uid_party1.clone(),
            uid_party2: c.uid_party2.clone(),
            filed_date: c.filed_date.format(DISPLAY_TIME_FORMAT).to_string(),
            associated_lawyers: c.associated_lawyers.clone(),
            associated_judge: c.associated_judge.clone(),
            case_subject: c.case_subject.clone(),
            latest_update: c.latest_update.clone(),
            client: c.client.clone(),
            case_type: c.case_type.clone(),
            description: c.description.clone(),
            status: c.status.clone(),
            approved: c.approved,
            rejected: c.rejected.clone(),
            decision_reason: c.decision_reason.clone(),
            file_cids: c.file_cids.clone(),
            assigned_registrar: id_str(c.assigned_registrar),
            assigned_stamp_reporter: id_str(c.assigned_stamp_reporter),
            assigned_bench_clerk: id_str(c.assigned_bench_clerk),
            judge_registrar: id_str(c.judge_registrar),
            created_at: c.created_at.format(DISPLAY_TIME_FORMAT).to_string(),
        }
    }
}

impl From<Case> for CaseResponse {
    fn from(c: Case) -> Self {
        Self::from(&c)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseListResponse {
    pub cases: Vec<CaseResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub case: CaseResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitterSummary {
    pub user_id: String,
    pub pending_cases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmitCaseResponse {
    pub message: String,
    pub case_id: String,
    pub user: SubmitterSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignmentResponse {
    pub message: String,
    pub case_id: String,
    pub stage: Stage,
    pub assigned_reviewer: String,
    /// Assignee's queue after the insert.
    pub reviewer_cases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
    pub case_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AcceptCaseResponse {
    pub message: String,
    pub case_id: String,
    /// Absent when no bench clerk exists yet.
    pub assigned_bench_clerk: Option<String>,
}

/// Outcome of one notification write in a decision fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationDelivery {
    pub recipient_role: Role,
    pub recipient_id: String,
    pub delivered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DecisionResponse {
    pub message: String,
    pub case_id: String,
    pub deliveries: Vec<NotificationDelivery>,
}
