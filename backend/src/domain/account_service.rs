//! Login, principal resolution, user listing and farmer invitations.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::accounts::{
    Account, FarmerInvite, Invitation, LoginCredentials, PasswordDigest, Principal, Role, UserId,
    generate_password,
};
use crate::domain::farm::Farm;
use crate::domain::ports::{AccountRepository, Notifier, RecordRepository, StoreError};
use crate::domain::scope::{ResourceKind, Scope, resolve_scope};
use crate::domain::validation::{FieldError, limits, optional_text};
use crate::domain::{Error, TraceId};

/// Where a client should send the user after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    FarmSelection,
    FarmDashboard,
}

impl Landing {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::FarmSelection,
            Role::Farmer => Self::FarmDashboard,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoginOutcome {
    pub account: Account,
    pub landing: Landing,
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    farms: Arc<dyn RecordRepository<Farm>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        farms: Arc<dyn RecordRepository<Farm>>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            farms,
            notifier,
            clock,
        }
    }

    fn not_found(id: UserId) -> Error {
        Error::not_found(format!("user {id} not found"))
    }

    /// Check credentials against the stored digest.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some((account, digest)) = self
            .accounts
            .find_credentials(credentials.username())
            .await?
        else {
            return Err(Error::unauthorized("invalid credentials"));
        };
        if !digest.verify(credentials.password()) {
            return Err(Error::unauthorized("invalid credentials"));
        }
        info!(user_id = %account.id, role = account.role.as_str(), "user logged in");
        let landing = Landing::for_role(account.role);
        Ok(LoginOutcome { account, landing })
    }

    /// Resolve a session's user id to a principal.
    pub async fn principal(&self, user_id: UserId) -> Result<Principal, Error> {
        self.accounts
            .find_by_id(user_id)
            .await?
            .map(|account| account.principal())
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Accounts visible to `principal`.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Account>, Error> {
        let scope = resolve_scope(principal, ResourceKind::Account);
        if scope == Scope::Nothing {
            return Ok(Vec::new());
        }
        Ok(self.accounts.list(&scope).await?)
    }

    /// One visible account.
    pub async fn get(&self, principal: &Principal, id: UserId) -> Result<Account, Error> {
        let scope = resolve_scope(principal, ResourceKind::Account);
        if !scope.admits_account(id) {
            return Err(Self::not_found(id));
        }
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Create a farmer account for `invite` and mail the credentials.
    pub async fn invite(
        &self,
        principal: &Principal,
        invite: FarmerInvite,
    ) -> Result<Account, Error> {
        let (account, password) = self.register_farmer(principal, invite).await?;
        self.send_invitation(Invitation {
            account: account.clone(),
            password,
        });
        Ok(account)
    }

    async fn register_farmer(
        &self,
        principal: &Principal,
        invite: FarmerInvite,
    ) -> Result<(Account, String), Error> {
        if !principal.is_admin() {
            return Err(Error::forbidden("only admins can invite farmers"));
        }
        let email = invite.normalised_email().ok_or_else(|| {
            FieldError::new("email", "invalid_email", "a valid email address is required")
        })?;
        if self
            .farms
            .find(invite.farm_id, &Scope::All)
            .await?
            .is_none()
        {
            return Err(FieldError::new(
                "farm_id",
                "unknown_reference",
                format!("farm {} does not exist", invite.farm_id),
            )
            .into());
        }

        let account = Account {
            id: UserId::random(),
            username: email.clone(),
            email,
            first_name: optional_text("first_name", &invite.first_name, limits::TEXT)?,
            last_name: optional_text("last_name", &invite.last_name, limits::TEXT)?,
            role: Role::Farmer,
            assigned_farm: Some(invite.farm_id),
            phone: optional_text("phone", &invite.phone, limits::PHONE)?,
            created_at: self.clock.utc(),
        };
        let password = generate_password();
        self.accounts
            .insert(&account, &PasswordDigest::derive(&password))
            .await
            .map_err(|err| match err {
                StoreError::Conflict { .. } => Error::conflict(format!(
                    "a user named {} already exists",
                    account.username
                )),
                other => other.into(),
            })?;
        info!(user_id = %account.id, farm_id = %invite.farm_id, "farmer invited");
        Ok((account, password))
    }

    /// Deliver invitation credentials on a detached task.
    fn send_invitation(&self, invitation: Invitation) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        TraceId::spawn_detached(async move {
            let notice = invitation.notice();
            if let Err(error) = notifier.notify(&notice).await {
                warn!(user_id = %invitation.account.id, %error, "invitation delivery failed");
            }
        })
    }

    /// Create an admin account unless `username` is already taken.
    /// Returns whether an account was created.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, Error> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if self
            .accounts
            .find_credentials(credentials.username())
            .await?
            .is_some()
        {
            return Ok(false);
        }
        let account = Account {
            id: UserId::random(),
            username: credentials.username().to_owned(),
            email: email.trim().to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Admin,
            assigned_farm: None,
            phone: String::new(),
            created_at: self.clock.utc(),
        };
        self.accounts
            .insert(&account, &PasswordDigest::derive(credentials.password()))
            .await?;
        info!(user_id = %account.id, username = %account.username, "bootstrap admin created");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
