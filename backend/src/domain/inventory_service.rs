//! Feed depletion workflow.
//!
//! Marking a feed finished flips its flags and raises a restock alert in one
//! store transaction; admins hear about new alerts afterwards.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::alert_dispatcher::AlertDispatcher;
use crate::domain::feed::{FeedCompletion, FeedKind};
use crate::domain::ports::InventoryRepository;
use crate::domain::scope::{Scope, resolve_scope};
use crate::domain::{Error, Principal};

#[derive(Clone)]
pub struct InventoryService {
    inventory: Arc<dyn InventoryRepository>,
    dispatcher: AlertDispatcher,
    clock: Arc<dyn Clock>,
}

impl InventoryService {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        dispatcher: AlertDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inventory,
            dispatcher,
            clock,
        }
    }

    /// Mark a visible feed of `kind` finished and raise its restock alert.
    ///
    /// Repeating the call is harmless: the flags stay set and the open alert
    /// is returned with `alert_created == false`.
    pub async fn mark_complete(
        &self,
        principal: &Principal,
        feed_id: Uuid,
        kind: FeedKind,
    ) -> Result<FeedCompletion, Error> {
        let resource = kind.resource_kind();
        let not_found = || Error::not_found(format!("{} {feed_id} not found", resource.label()));
        let scope = resolve_scope(principal, resource);
        if scope == Scope::Nothing {
            return Err(not_found());
        }

        let completion = self
            .inventory
            .complete_feed(kind, feed_id, &scope, principal.user_id, self.clock.utc())
            .await?
            .ok_or_else(not_found)?;

        info!(
            %feed_id,
            farm_id = %completion.feed.farm_id(),
            alert_id = %completion.alert.id,
            alert_created = completion.alert_created,
            "feed marked finished"
        );
        self.dispatcher
            .dispatch(&completion.alert, completion.alert_created);
        Ok(completion)
    }
}
