//! Restock alert persistence and admin notification.
//!
//! Alerts are stored first; telling admins happens afterwards on a detached
//! task carrying the request trace id. Delivery problems are logged and
//! never reach the caller.

use std::sync::Arc;

use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::alerts::{AlertContext, RestockAlert, RestockAlertDraft};
use crate::domain::farm::Farm;
use crate::domain::ports::{AccountRepository, AlertRepository, Notifier, RecordRepository};
use crate::domain::scope::{ResourceKind, Scope, resolve_scope};
use crate::domain::{Error, Principal, TraceId};

/// Raises, lists and resolves restock alerts.
#[derive(Clone)]
pub struct AlertDispatcher {
    alerts: Arc<dyn AlertRepository>,
    farms: Arc<dyn RecordRepository<Farm>>,
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AlertDispatcher {
    pub fn new(
        alerts: Arc<dyn AlertRepository>,
        farms: Arc<dyn RecordRepository<Farm>>,
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            alerts,
            farms,
            accounts,
            notifier,
            clock,
        }
    }

    fn not_found(id: Uuid) -> Error {
        Error::not_found(format!("restock alert {id} not found"))
    }

    /// Alerts visible to `principal`.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<RestockAlert>, Error> {
        let scope = resolve_scope(principal, ResourceKind::RestockAlert);
        if scope == Scope::Nothing {
            return Ok(Vec::new());
        }
        Ok(self.alerts.list(&scope).await?)
    }

    /// One visible alert.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<RestockAlert, Error> {
        let scope = resolve_scope(principal, ResourceKind::RestockAlert);
        if scope == Scope::Nothing {
            return Err(Self::not_found(id));
        }
        self.alerts
            .find(id, &scope)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Persist an alert, deduplicated against open alerts for the same farm
    /// and item, then notify admins when a new one was stored.
    ///
    /// Feed completion does not come through here: it raises its alert in
    /// the same store transaction as the feed update and hands the outcome
    /// to [`AlertDispatcher::dispatch`].
    pub async fn raise_alert(
        &self,
        draft: RestockAlertDraft,
    ) -> Result<(RestockAlert, bool), Error> {
        let (alert, created) = self.alerts.raise(&draft, self.clock.utc()).await?;
        self.dispatch(&alert, created);
        Ok((alert, created))
    }

    /// Record the outcome of a raise and announce newly stored alerts.
    /// Returns the notification task when one was started.
    pub fn dispatch(&self, alert: &RestockAlert, created: bool) -> Option<JoinHandle<()>> {
        if !created {
            debug!(alert_id = %alert.id, "open restock alert already exists");
            return None;
        }
        info!(alert_id = %alert.id, farm_id = %alert.farm_id, item = %alert.item_name, "restock alert raised");
        Some(self.announce(alert.clone()))
    }

    /// Mark an alert resolved. Admin only.
    pub async fn resolve(&self, principal: &Principal, id: Uuid) -> Result<RestockAlert, Error> {
        if !principal.is_admin() {
            return Err(Error::forbidden("only admins can resolve restock alerts"));
        }
        let alert = self
            .alerts
            .resolve(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        info!(alert_id = %alert.id, "restock alert resolved");
        Ok(alert)
    }

    /// Notify every admin about `alert` on a detached task.
    pub fn announce(&self, alert: RestockAlert) -> JoinHandle<()> {
        let dispatcher = self.clone();
        TraceId::spawn_detached(async move { dispatcher.deliver(alert).await })
    }

    async fn deliver(&self, alert: RestockAlert) {
        let recipients = match self.accounts.admin_contacts().await {
            Ok(recipients) => recipients,
            Err(error) => {
                warn!(alert_id = %alert.id, %error, "could not load admin contacts");
                return;
            }
        };
        if recipients.is_empty() {
            debug!(alert_id = %alert.id, "no admin contacts to notify");
            return;
        }

        let farm = match self.farms.find(alert.farm_id, &Scope::All).await {
            Ok(Some(farm)) => farm,
            Ok(None) => {
                warn!(alert_id = %alert.id, farm_id = %alert.farm_id, "alert farm vanished before notification");
                return;
            }
            Err(error) => {
                warn!(alert_id = %alert.id, %error, "could not load alert farm");
                return;
            }
        };
        let reporter = match self.accounts.find_by_id(alert.created_by).await {
            Ok(reporter) => reporter,
            Err(error) => {
                debug!(alert_id = %alert.id, %error, "could not load alert reporter");
                None
            }
        };

        let alert_id = alert.id;
        let notice = AlertContext {
            alert,
            farm,
            reporter,
        }
        .notice(recipients);
        match self.notifier.notify(&notice).await {
            Ok(()) => info!(%alert_id, recipients = notice.recipients.len(), "restock alert sent"),
            Err(error) => warn!(%alert_id, %error, "restock alert notification failed"),
        }
    }
}

#[cfg(test)]
#[path = "alert_dispatcher_tests.rs"]
mod tests;
