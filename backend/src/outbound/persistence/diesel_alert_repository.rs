//! PostgreSQL-backed restock alerts.
//!
//! Deduplication leans on the partial unique index over unresolved
//! `(farm_id, item_name)`: the insert uses `ON CONFLICT DO NOTHING` and a
//! skipped insert reads back the alert that is already open.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{AlertRepository, StoreError};
use crate::domain::{RestockAlert, RestockAlertDraft, Scope};

use super::diesel_farm_store::DieselFarmStore;
use super::models::RestockAlertRow;
use super::schema::restock_alerts;

/// Insert `draft` unless an unresolved alert for the same farm and item
/// exists. Returns the open alert and whether it was created.
pub(super) async fn raise_alert(
    conn: &mut AsyncPgConnection,
    draft: &RestockAlertDraft,
    now: DateTime<Utc>,
) -> Result<(RestockAlert, bool), StoreError> {
    let row = RestockAlertRow::open(draft, now);
    let inserted = diesel::insert_into(restock_alerts::table)
        .values(&row)
        .on_conflict_do_nothing()
        .execute(&mut *conn)
        .await?;
    if inserted > 0 {
        info!(alert_id = %row.id, farm_id = %row.farm_id, item = %row.item_name, "restock alert raised");
        return Ok((RestockAlert::try_from(row)?, true));
    }

    let open = restock_alerts::table
        .filter(restock_alerts::farm_id.eq(draft.farm_id))
        .filter(restock_alerts::item_name.eq(&draft.item_name))
        .filter(restock_alerts::is_resolved.eq(false))
        .select(RestockAlertRow::as_select())
        .first(conn)
        .await?;
    Ok((RestockAlert::try_from(open)?, false))
}

#[async_trait]
impl AlertRepository for DieselFarmStore {
    async fn list(&self, scope: &Scope) -> Result<Vec<RestockAlert>, StoreError> {
        let mut query = restock_alerts::table
            .select(RestockAlertRow::as_select())
            .order_by((restock_alerts::created_at.desc(), restock_alerts::id.asc()))
            .into_boxed();
        query = match scope {
            Scope::All => query,
            Scope::Farm(farm_id) => query.filter(restock_alerts::farm_id.eq(*farm_id)),
            Scope::Account(_) | Scope::Nothing => return Ok(Vec::new()),
        };
        let mut conn = self.conn().await?;
        let rows: Vec<RestockAlertRow> = query.load(&mut conn).await?;
        rows.into_iter().map(RestockAlert::try_from).collect()
    }

    async fn find(&self, id: Uuid, scope: &Scope) -> Result<Option<RestockAlert>, StoreError> {
        let mut conn = self.conn().await?;
        let row = restock_alerts::table
            .find(id)
            .select(RestockAlertRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.filter(|row| scope.admits_farm(row.farm_id))
            .map(RestockAlert::try_from)
            .transpose()
    }

    async fn raise(
        &self,
        draft: &RestockAlertDraft,
        now: DateTime<Utc>,
    ) -> Result<(RestockAlert, bool), StoreError> {
        let mut conn = self.conn().await?;
        raise_alert(&mut conn, draft, now).await
    }

    async fn resolve(&self, id: Uuid) -> Result<Option<RestockAlert>, StoreError> {
        let mut conn = self.conn().await?;
        let row = diesel::update(restock_alerts::table.find(id))
            .set(restock_alerts::is_resolved.eq(true))
            .returning(RestockAlertRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;
        row.map(RestockAlert::try_from).transpose()
    }
}
