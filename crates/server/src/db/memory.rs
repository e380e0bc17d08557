use shared_types::{AppError, Case, CaseUpdate, Notification, Role, User, UserUpdate};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local document store.
///
/// Collections are insertion-ordered vectors behind async locks. Each method
/// takes its lock once, so a single-document mutation is atomic with respect
/// to every other call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    cases: RwLock<Vec<Case>>,
    lawyer_notifications: RwLock<Vec<Notification>>,
}

impl MemoryStore {
    // ── users ──

    pub async fn insert_user(&self, user: User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::conflict("This username is already taken"));
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::conflict("An account with this email already exists"));
        }
        users.push(user);
        Ok(())
    }

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub async fn users_by_role(&self, role: Role) -> Vec<User> {
        self.users
            .read()
            .await
            .iter()
            .filter(|u| u.role() == role)
            .cloned()
            .collect()
    }

    pub async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.iter_mut().find(|u| u.id == id)?;
        user.apply(update);
        Some(user.clone())
    }

    // ── cases ──

    pub async fn insert_case(&self, case: Case) -> Result<(), AppError> {
        let mut cases = self.cases.write().await;
        if cases.iter().any(|c| c.id == case.id) {
            return Err(AppError::conflict("A record with this value already exists"));
        }
        cases.push(case);
        Ok(())
    }

    pub async fn find_case(&self, id: Uuid) -> Option<Case> {
        self.cases.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn cases_by_lawyer(&self, lawyer_id: Uuid) -> Vec<Case> {
        self.cases
            .read()
            .await
            .iter()
            .filter(|c| c.lawyer_id == lawyer_id)
            .cloned()
            .collect()
    }

    pub async fn update_case(&self, id: Uuid, update: &CaseUpdate) -> Option<Case> {
        let mut cases = self.cases.write().await;
        let case = cases.iter_mut().find(|c| c.id == id)?;
        case.apply(update);
        Some(case.clone())
    }

    // ── lawyer notifications ──

    /// Returns `false` when a notification with the same id is already stored.
    pub async fn insert_lawyer_notification(&self, notification: Notification) -> bool {
        let mut notes = self.lawyer_notifications.write().await;
        if notes.iter().any(|n| n.id == notification.id) {
            return false;
        }
        notes.push(notification);
        true
    }

    pub async fn lawyer_notifications(&self, lawyer_id: Uuid) -> Vec<Notification> {
        self.lawyer_notifications
            .read()
            .await
            .iter()
            .filter(|n| n.lawyer_id == lawyer_id)
            .cloned()
            .collect()
    }
}
