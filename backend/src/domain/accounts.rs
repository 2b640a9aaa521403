//! Accounts, roles and the authenticated principal.
//!
//! An [`Account`] is the stored user record. The [`Principal`] is the slice of
//! it that access decisions need: identity, role and the assigned farm.
//! Password digests live beside accounts but never inside them, so no read
//! model can serialise one by accident.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use super::notice::Notice;

const SALT_LEN: usize = 16;
const INVITE_PASSWORD_LEN: usize = 12;

/// Subject line of invitation messages.
pub const INVITATION_SUBJECT: &str = "Dairy Farm App Invitation";

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw).map(Self)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Cross-farm operator.
    Admin,
    /// Works on a single assigned farm.
    Farmer,
}

impl Role {
    /// Wire and storage name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Farmer => "farmer",
        }
    }

    /// Parse a stored role name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Self::Admin),
            "farmer" => Some(Self::Farmer),
            _ => None,
        }
    }
}

/// Authenticated caller as seen by access rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Account identifier.
    pub user_id: UserId,
    /// Account role.
    pub role: Role,
    /// Farm a farmer works on; admins usually have none.
    pub assigned_farm: Option<Uuid>,
}

impl Principal {
    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub assigned_farm: Option<Uuid>,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Derive the access principal for this account.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            role: self.role,
            assigned_farm: self.assigned_farm,
        }
    }

    /// Name used in notices, falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

/// Validation errors for login payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and password pair submitted at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Validate and build credentials from raw parts.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Salted SHA-256 password digest stored as `salt$hash` in hex.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Derive a digest for `password` with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        let salt: [u8; SALT_LEN] = rand::thread_rng().r#gen();
        Self::with_salt(&salt, password)
    }

    fn with_salt(salt: &[u8], password: &str) -> Self {
        let hash = hash_with_salt(salt, password);
        Self(format!("{}${}", hex::encode(salt), hex::encode(hash)))
    }

    /// Wrap a digest loaded from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check `password` against the digest in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let Some((salt_hex, hash_hex)) = self.0.split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
            return false;
        };
        let actual = hash_with_salt(&salt, password);
        if actual.len() != expected.len() {
            return false;
        }
        actual
            .iter()
            .zip(expected.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

fn hash_with_salt(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Generate a random alphanumeric password for invited farmers.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Invitation request for a new farmer account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FarmerInvite {
    pub email: String,
    pub farm_id: Uuid,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

impl FarmerInvite {
    /// Normalised email, or `None` when it cannot be an address.
    pub fn normalised_email(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty() && email.contains('@')).then(|| email.to_owned())
    }
}

/// Credentials handed to a newly invited farmer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub account: Account,
    pub password: String,
}

impl Invitation {
    /// Plain-text body of the invitation message.
    pub fn message_body(&self) -> String {
        format!(
            "You have been invited to join the dairy farm management system.\n\n\
             Login credentials:\nUsername: {}\nPassword: {}\n\n\
             Please change your password after first login.",
            self.account.username, self.password
        )
    }

    /// Notice delivering the credentials to the invitee.
    pub fn notice(&self) -> Notice {
        Notice::plain(
            vec![self.account.email.clone()],
            INVITATION_SUBJECT,
            self.message_body(),
        )
    }
}
