//! Account and app records shared by the stores.
//!
//! [`AuthState`] holds the authoritative maps; [`StoreSnapshot`] is its
//! serialised form. Both stores wrap the state in their own lock.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::ports::{AppPersistenceError, UserPersistenceError};
use crate::domain::{App, AppId, AppSecret, Email, PasswordHash, User, UserId};

const FIRST_USER_ID: i64 = 1;

/// Errors raised while turning a snapshot back into live state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Two user records share an id.
    #[error("duplicate user id {0}")]
    DuplicateUserId(i64),
    /// Two user records share an email.
    #[error("duplicate user email {0}")]
    DuplicateEmail(String),
    /// Two app records share an id.
    #[error("duplicate app id {0}")]
    DuplicateAppId(i32),
    /// The stored password hash cannot be encoded as text.
    #[error("password hash for user {0} is not valid UTF-8")]
    NonUtf8Hash(i64),
}

/// Serialised user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned id.
    pub id: i64,
    /// Account email.
    pub email: Email,
    /// PHC-encoded password hash.
    pub password_hash: String,
    /// Externally managed admin flag.
    #[serde(default)]
    pub is_admin: bool,
}

/// Serialised app row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Externally assigned id.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Token signing secret.
    pub secret: String,
}

fn first_user_id() -> i64 {
    FIRST_USER_ID
}

/// On-disk form of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Id handed to the next registered user.
    #[serde(default = "first_user_id")]
    pub next_user_id: i64,
    /// Registered users.
    #[serde(default)]
    pub users: Vec<UserRecord>,
    /// Provisioned apps.
    #[serde(default)]
    pub apps: Vec<AppRecord>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            next_user_id: FIRST_USER_ID,
            users: Vec::new(),
            apps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    is_admin: bool,
}

/// Live store contents.
#[derive(Debug, Clone)]
pub(crate) struct AuthState {
    next_user_id: i64,
    accounts: BTreeMap<UserId, Account>,
    by_email: HashMap<Email, UserId>,
    apps: BTreeMap<AppId, App>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            next_user_id: FIRST_USER_ID,
            accounts: BTreeMap::new(),
            by_email: HashMap::new(),
            apps: BTreeMap::new(),
        }
    }
}

impl AuthState {
    pub(crate) fn insert_user(
        &mut self,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<UserId, UserPersistenceError> {
        if self.by_email.contains_key(email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let id = UserId::new(self.next_user_id);
        self.next_user_id = self
            .next_user_id
            .checked_add(1)
            .ok_or_else(|| UserPersistenceError::query("user id space exhausted"))?;
        self.by_email.insert(email.clone(), id);
        self.accounts.insert(
            id,
            Account {
                user: User::new(id, email.clone(), password_hash.clone()),
                is_admin: false,
            },
        );
        Ok(id)
    }

    pub(crate) fn user_by_email(&self, email: &Email) -> Result<User, UserPersistenceError> {
        self.by_email
            .get(email)
            .and_then(|id| self.accounts.get(id))
            .map(|account| account.user.clone())
            .ok_or_else(UserPersistenceError::not_found)
    }

    pub(crate) fn is_admin(&self, user_id: UserId) -> Result<bool, UserPersistenceError> {
        self.accounts
            .get(&user_id)
            .map(|account| account.is_admin)
            .ok_or_else(UserPersistenceError::not_found)
    }

    pub(crate) fn set_admin(
        &mut self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<bool, UserPersistenceError> {
        let account = self
            .accounts
            .get_mut(&user_id)
            .ok_or_else(UserPersistenceError::not_found)?;
        Ok(std::mem::replace(&mut account.is_admin, is_admin))
    }

    pub(crate) fn app(&self, app_id: AppId) -> Result<App, AppPersistenceError> {
        self.apps
            .get(&app_id)
            .cloned()
            .ok_or_else(AppPersistenceError::not_found)
    }

    pub(crate) fn upsert_app(&mut self, app: App) -> Option<App> {
        self.apps.insert(app.id(), app)
    }

    pub(crate) fn user_count(&self) -> usize {
        self.accounts.len()
    }

    pub(crate) fn to_snapshot(&self) -> Result<StoreSnapshot, SnapshotError> {
        let users = self
            .accounts
            .values()
            .map(|account| {
                let id = account.user.id().get();
                let password_hash = std::str::from_utf8(account.user.password_hash().as_bytes())
                    .map_err(|_| SnapshotError::NonUtf8Hash(id))?
                    .to_owned();
                Ok(UserRecord {
                    id,
                    email: account.user.email().clone(),
                    password_hash,
                    is_admin: account.is_admin,
                })
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;
        let apps = self
            .apps
            .values()
            .map(|app| AppRecord {
                id: app.id().get(),
                name: app.name().to_owned(),
                secret: app.secret().expose().to_owned(),
            })
            .collect();
        Ok(StoreSnapshot {
            next_user_id: self.next_user_id,
            users,
            apps,
        })
    }

    /// Rebuild state from a snapshot.
    ///
    /// `next_user_id` is raised past the highest stored id if needed.
    pub(crate) fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, SnapshotError> {
        let mut state = Self {
            next_user_id: snapshot.next_user_id.max(FIRST_USER_ID),
            ..Self::default()
        };
        for record in snapshot.users {
            let id = UserId::new(record.id);
            if state.accounts.contains_key(&id) {
                return Err(SnapshotError::DuplicateUserId(record.id));
            }
            if state.by_email.contains_key(&record.email) {
                return Err(SnapshotError::DuplicateEmail(record.email.to_string()));
            }
            state.by_email.insert(record.email.clone(), id);
            state.accounts.insert(
                id,
                Account {
                    user: User::new(
                        id,
                        record.email,
                        PasswordHash::from_bytes(record.password_hash.into_bytes()),
                    ),
                    is_admin: record.is_admin,
                },
            );
            state.next_user_id = state.next_user_id.max(record.id.saturating_add(1));
        }
        for record in snapshot.apps {
            let app = App::new(
                AppId::new(record.id),
                record.name,
                AppSecret::new(record.secret),
            );
            if state.upsert_app(app).is_some() {
                return Err(SnapshotError::DuplicateAppId(record.id));
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    fn email(raw: &str) -> Email {
        Email::new(raw).expect("valid email")
    }

    fn hash() -> PasswordHash {
        PasswordHash::from_bytes(b"$argon2id$stub".to_vec())
    }

    #[fixture]
    fn state() -> AuthState {
        AuthState::default()
    }

    #[rstest]
    fn ids_start_at_one_and_increase(mut state: AuthState) {
        let first = state.insert_user(&email("a@x.com"), &hash()).expect("insert");
        let second = state.insert_user(&email("b@x.com"), &hash()).expect("insert");
        assert_eq!((first.get(), second.get()), (1, 2));
    }

    #[rstest]
    fn duplicate_emails_keep_one_account(mut state: AuthState) {
        state.insert_user(&email("a@x.com"), &hash()).expect("insert");
        let err = state
            .insert_user(&email("a@x.com"), &hash())
            .expect_err("duplicate");
        assert_eq!(err, UserPersistenceError::DuplicateEmail);
        assert_eq!(state.user_count(), 1);
    }

    #[rstest]
    fn admin_flag_defaults_to_false_and_can_be_set(mut state: AuthState) {
        let id = state.insert_user(&email("a@x.com"), &hash()).expect("insert");
        assert_eq!(state.is_admin(id), Ok(false));
        assert_eq!(state.set_admin(id, true), Ok(false));
        assert_eq!(state.is_admin(id), Ok(true));
        assert_eq!(
            state.is_admin(UserId::new(99)),
            Err(UserPersistenceError::NotFound)
        );
    }

    #[rstest]
    fn snapshot_restores_users_apps_and_counter(mut state: AuthState) {
        let id = state.insert_user(&email("a@x.com"), &hash()).expect("insert");
        state.set_admin(id, true).expect("known user");
        state.upsert_app(App::new(AppId::new(1), "portal", AppSecret::new("s")));

        let snapshot = state.to_snapshot().expect("snapshot");
        let mut restored = AuthState::from_snapshot(snapshot).expect("restore");

        assert_eq!(restored.is_admin(id), Ok(true));
        assert_eq!(restored.app(AppId::new(1)).map(|app| app.id()), Ok(AppId::new(1)));
        let next = restored
            .insert_user(&email("b@x.com"), &hash())
            .expect("insert");
        assert_eq!(next.get(), 2);
    }

    #[rstest]
    fn snapshot_counter_is_raised_past_stored_ids() {
        let snapshot = StoreSnapshot {
            next_user_id: 1,
            users: vec![UserRecord {
                id: 5,
                email: email("a@x.com"),
                password_hash: "h".to_owned(),
                is_admin: false,
            }],
            apps: Vec::new(),
        };
        let mut state = AuthState::from_snapshot(snapshot).expect("restore");
        let id = state.insert_user(&email("b@x.com"), &hash()).expect("insert");
        assert_eq!(id.get(), 6);
    }

    #[rstest]
    fn snapshot_rejects_duplicate_emails() {
        let record = |id| UserRecord {
            id,
            email: email("a@x.com"),
            password_hash: "h".to_owned(),
            is_admin: false,
        };
        let snapshot = StoreSnapshot {
            users: vec![record(1), record(2)],
            ..StoreSnapshot::default()
        };
        assert_eq!(
            AuthState::from_snapshot(snapshot).map(|_| ()),
            Err(SnapshotError::DuplicateEmail("a@x.com".to_owned()))
        );
    }

    #[rstest]
    fn non_utf8_hashes_cannot_be_snapshotted(mut state: AuthState) {
        state
            .insert_user(&email("a@x.com"), &PasswordHash::from_bytes(vec![0xff]))
            .expect("insert");
        assert_eq!(
            state.to_snapshot().map(|_| ()),
            Err(SnapshotError::NonUtf8Hash(1))
        );
    }
}
