use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::notification::Notification;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Position of a user in the filing workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Lawyer,
    Registrar,
    StampReporter,
    BenchClerk,
    Judge,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Lawyer,
        Role::Registrar,
        Role::StampReporter,
        Role::BenchClerk,
        Role::Judge,
    ];

    /// Wire / storage name, e.g. `stamp-reporter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lawyer => "lawyer",
            Role::Registrar => "registrar",
            Role::StampReporter => "stamp-reporter",
            Role::BenchClerk => "bench-clerk",
            Role::Judge => "judge",
        }
    }

    pub fn is_reviewer(&self) -> bool {
        !matches!(self, Role::Lawyer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Stamp-reporter credential
// ---------------------------------------------------------------------------

/// Opaque token issued to a stamp reporter at signup.
///
/// This is a shared secret compared by value when a case is accepted. It is
/// not a signature scheme and proves nothing about the document contents.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SharedSecretCredential(String);

impl SharedSecretCredential {
    pub fn issue() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compare against a presented value without short-circuiting on the
    /// first differing byte.
    pub fn matches(&self, presented: &str) -> bool {
        let stored = self.0.as_bytes();
        let presented = presented.as_bytes();
        if stored.len() != presented.len() {
            return false;
        }
        stored
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl From<String> for SharedSecretCredential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SharedSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecretCredential(***)")
    }
}

// ---------------------------------------------------------------------------
// Role-specific state
// ---------------------------------------------------------------------------

/// Case ledger kept for a lawyer. Counts are derived from list lengths.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LawyerState {
    #[serde(default)]
    pub pending_cases: Vec<Uuid>,
    #[serde(default)]
    pub verified_cases: Vec<Uuid>,
    #[serde(default)]
    pub rejected_cases: Vec<Uuid>,
}

/// Desk shared by every reviewer role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewerState {
    /// Assignment queue, in assignment order. Holds each case at most once.
    #[serde(default)]
    pub cases: Vec<Uuid>,
    #[serde(default)]
    pub verified_cases: Vec<Uuid>,
    #[serde(default)]
    pub rejected_cases: Vec<Uuid>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StampReporterState {
    #[serde(flatten)]
    pub desk: ReviewerState,
    pub digital_sign: SharedSecretCredential,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum RoleState {
    Lawyer(LawyerState),
    Registrar(ReviewerState),
    StampReporter(StampReporterState),
    BenchClerk(ReviewerState),
    Judge(ReviewerState),
}

impl RoleState {
    /// Fresh state for a new account. Stamp reporters get a credential.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Lawyer => RoleState::Lawyer(LawyerState::default()),
            Role::Registrar => RoleState::Registrar(ReviewerState::default()),
            Role::StampReporter => RoleState::StampReporter(StampReporterState {
                desk: ReviewerState::default(),
                digital_sign: SharedSecretCredential::issue(),
            }),
            Role::BenchClerk => RoleState::BenchClerk(ReviewerState::default()),
            Role::Judge => RoleState::Judge(ReviewerState::default()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleState::Lawyer(_) => Role::Lawyer,
            RoleState::Registrar(_) => Role::Registrar,
            RoleState::StampReporter(_) => Role::StampReporter,
            RoleState::BenchClerk(_) => Role::BenchClerk,
            RoleState::Judge(_) => Role::Judge,
        }
    }

    pub fn desk(&self) -> Option<&ReviewerState> {
        match self {
            RoleState::Lawyer(_) => None,
            RoleState::StampReporter(s) => Some(&s.desk),
            RoleState::Registrar(d) | RoleState::BenchClerk(d) | RoleState::Judge(d) => Some(d),
        }
    }

    fn desk_mut(&mut self) -> Option<&mut ReviewerState> {
        match self {
            RoleState::Lawyer(_) => None,
            RoleState::StampReporter(s) => Some(&mut s.desk),
            RoleState::Registrar(d) | RoleState::BenchClerk(d) | RoleState::Judge(d) => Some(d),
        }
    }
}

// ---------------------------------------------------------------------------
// User document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub state: RoleState,
}

/// Single-document mutation applied by the store under its per-document
/// atomicity. Every variant is idempotent.
#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    /// Lawyer submitted a case.
    RecordPending(Uuid),
    /// Case passed this user's stage (lawyer: forwarded to a registrar).
    RecordVerified(Uuid),
    RecordRejected(Uuid),
    /// Reviewer queue insert.
    Enqueue(Uuid),
    /// Reviewer embedded notification.
    Notify(Notification),
}

fn insert_unique(list: &mut Vec<Uuid>, id: Uuid) -> bool {
    if list.contains(&id) {
        return false;
    }
    list.push(id);
    true
}

impl User {
    pub fn role(&self) -> Role {
        self.state.role()
    }

    /// Reviewer queue; empty for lawyers.
    pub fn queue(&self) -> &[Uuid] {
        self.state.desk().map(|d| d.cases.as_slice()).unwrap_or(&[])
    }

    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.state
            .desk()
            .map(|d| d.notifications.as_slice())
            .unwrap_or(&[])
    }

    pub fn digital_sign(&self) -> Option<&SharedSecretCredential> {
        match &self.state {
            RoleState::StampReporter(s) => Some(&s.digital_sign),
            _ => None,
        }
    }

    pub fn pending_cases(&self) -> &[Uuid] {
        match &self.state {
            RoleState::Lawyer(l) => &l.pending_cases,
            _ => &[],
        }
    }

    pub fn verified_cases(&self) -> &[Uuid] {
        match &self.state {
            RoleState::Lawyer(l) => &l.verified_cases,
            other => other.desk().map(|d| d.verified_cases.as_slice()).unwrap_or(&[]),
        }
    }

    pub fn rejected_cases(&self) -> &[Uuid] {
        match &self.state {
            RoleState::Lawyer(l) => &l.rejected_cases,
            other => other.desk().map(|d| d.rejected_cases.as_slice()).unwrap_or(&[]),
        }
    }

    /// Apply a mutation. Returns `true` when the document changed; updates
    /// that do not fit the role or are already present are no-ops.
    pub fn apply(&mut self, update: &UserUpdate) -> bool {
        match (update, &mut self.state) {
            (UserUpdate::RecordPending(id), RoleState::Lawyer(l)) => {
                insert_unique(&mut l.pending_cases, *id)
            }
            (UserUpdate::RecordVerified(id), RoleState::Lawyer(l)) => {
                insert_unique(&mut l.verified_cases, *id)
            }
            (UserUpdate::RecordRejected(id), RoleState::Lawyer(l)) => {
                insert_unique(&mut l.rejected_cases, *id)
            }
            (UserUpdate::RecordPending(_), _) => false,
            (update, state) => {
                let Some(desk) = state.desk_mut() else {
                    return false;
                };
                match update {
                    UserUpdate::RecordVerified(id) => insert_unique(&mut desk.verified_cases, *id),
                    UserUpdate::RecordRejected(id) => insert_unique(&mut desk.rejected_cases, *id),
                    UserUpdate::Enqueue(id) => insert_unique(&mut desk.cases, *id),
                    UserUpdate::Notify(n) => {
                        if desk.notifications.iter().any(|existing| existing.id == n.id) {
                            false
                        } else {
                            desk.notifications.push(n.clone());
                            true
                        }
                    }
                    UserUpdate::RecordPending(_) => false,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// POST /signup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct SignupRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 3, message = "Username must be at least 3 characters"))
    )]
    pub username: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 8, message = "Password must be at least 8 characters"))
    )]
    pub password: String,
    #[serde(default)]
    pub phone_number: String,
    /// `lawyer`, `registrar`, `stamp-reporter`, `bench-clerk` or `judge`.
    #[serde(alias = "role")]
    pub user_type: Role,
}

/// POST / and POST /login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// API Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
    /// Only present for stamp reporters; needed to accept cases later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_sign: Option<String>,
}

/// Minimal profile returned on login and from `/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub user_type: Role,
    pub pending_cases: usize,
    pub verified_cases: usize,
    pub rejected_cases: usize,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.clone(),
            user_type: u.role(),
            pending_cases: u.pending_cases().len(),
            verified_cases: u.verified_cases().len(),
            rejected_cases: u.rejected_cases().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_data: UserProfile,
}

/// GET /registrar/{user_id}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegistrarDashboard {
    pub name: String,
    pub total_cases: usize,
    pub notifications: usize,
}
