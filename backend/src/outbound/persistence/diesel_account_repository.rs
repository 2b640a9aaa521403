//! PostgreSQL-backed account persistence.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountRepository, StoreError};
use crate::domain::{Account, PasswordDigest, Role, Scope, UserId};

use super::diesel_farm_store::DieselFarmStore;
use super::models::AccountRow;
use super::schema::accounts;

#[async_trait]
impl AccountRepository for DieselFarmStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        let mut conn = self.conn().await?;
        let row = accounts::table
            .find(*id.as_uuid())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(|row| row.into_parts().map(|(account, _)| account))
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(Account, PasswordDigest)>, StoreError> {
        let mut conn = self.conn().await?;
        let row = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(AccountRow::into_parts).transpose()
    }

    async fn list(&self, scope: &Scope) -> Result<Vec<Account>, StoreError> {
        let mut query = accounts::table
            .select(AccountRow::as_select())
            .order_by((accounts::created_at.asc(), accounts::id.asc()))
            .into_boxed();
        query = match scope {
            Scope::All => query,
            Scope::Account(id) => query.filter(accounts::id.eq(*id.as_uuid())),
            Scope::Farm(farm_id) => query.filter(accounts::assigned_farm.eq(*farm_id)),
            Scope::Nothing => return Ok(Vec::new()),
        };
        let mut conn = self.conn().await?;
        let rows: Vec<AccountRow> = query.load(&mut conn).await?;
        rows.into_iter()
            .map(|row| row.into_parts().map(|(account, _)| account))
            .collect()
    }

    async fn insert(&self, account: &Account, digest: &PasswordDigest) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        diesel::insert_into(accounts::table)
            .values(&AccountRow::new(account, digest))
            .execute(&mut conn)
            .await
            .map_err(|error| match StoreError::from(error) {
                StoreError::Conflict { .. } => StoreError::conflict(format!(
                    "username `{}` is already taken",
                    account.username
                )),
                other => other,
            })?;
        Ok(())
    }

    async fn admin_contacts(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        let emails: Vec<String> = accounts::table
            .filter(accounts::role.eq(Role::Admin.as_str()))
            .filter(accounts::email.ne(""))
            .select(accounts::email)
            .order_by(accounts::created_at.asc())
            .load(&mut conn)
            .await?;
        Ok(emails
            .into_iter()
            .filter(|email| !email.trim().is_empty())
            .collect())
    }
}
