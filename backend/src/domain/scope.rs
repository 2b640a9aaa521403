//! Access scoping rules.
//!
//! Every read and write passes through [`resolve_scope`], which turns a
//! principal and a resource kind into a [`Scope`]. Admins always see
//! everything; farmers follow the fixed [`FARMER_RULES`] table.

use serde::Serialize;
use uuid::Uuid;

use super::accounts::{Principal, Role, UserId};

/// Kinds of resources subject to access scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Farm,
    Animal,
    ChickenBatch,
    MilkProduction,
    MilkSale,
    Feed,
    ChickenFeed,
    FeedConsumption,
    HealthRecord,
    EggProduction,
    RestockAlert,
    Account,
}

impl ResourceKind {
    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Farm => "farm",
            Self::Animal => "animal",
            Self::ChickenBatch => "chicken batch",
            Self::MilkProduction => "milk production record",
            Self::MilkSale => "milk sale",
            Self::Feed => "feed",
            Self::ChickenFeed => "chicken feed",
            Self::FeedConsumption => "feed consumption record",
            Self::HealthRecord => "health record",
            Self::EggProduction => "egg production record",
            Self::RestockAlert => "restock alert",
            Self::Account => "user",
        }
    }
}

/// Set of records visible to a principal for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every record.
    All,
    /// Records whose owning farm is the given farm.
    Farm(Uuid),
    /// Only the account with the given id.
    Account(UserId),
    /// No records at all.
    Nothing,
}

impl Scope {
    /// Whether a record owned by `farm_id` lies inside this scope.
    pub fn admits_farm(&self, farm_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Farm(scoped) => *scoped == farm_id,
            Self::Account(_) | Self::Nothing => false,
        }
    }

    /// Whether the account `user_id` lies inside this scope.
    pub fn admits_account(&self, user_id: UserId) -> bool {
        match self {
            Self::All => true,
            Self::Account(scoped) => *scoped == user_id,
            Self::Farm(_) | Self::Nothing => false,
        }
    }
}

/// How a farmer's visibility is derived for a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmerRule {
    /// Records owned (directly or through an animal or batch) by the
    /// assigned farm.
    AssignedFarm,
    /// The farmer's own account only.
    SelfOnly,
    /// Nothing is visible.
    Denied,
}

/// Farmer visibility per resource kind.
pub const FARMER_RULES: [(ResourceKind, FarmerRule); 12] = [
    (ResourceKind::Farm, FarmerRule::AssignedFarm),
    (ResourceKind::Animal, FarmerRule::AssignedFarm),
    (ResourceKind::ChickenBatch, FarmerRule::AssignedFarm),
    (ResourceKind::Feed, FarmerRule::AssignedFarm),
    (ResourceKind::ChickenFeed, FarmerRule::AssignedFarm),
    (ResourceKind::MilkProduction, FarmerRule::AssignedFarm),
    (ResourceKind::FeedConsumption, FarmerRule::AssignedFarm),
    (ResourceKind::EggProduction, FarmerRule::AssignedFarm),
    (ResourceKind::MilkSale, FarmerRule::Denied),
    (ResourceKind::HealthRecord, FarmerRule::Denied),
    (ResourceKind::RestockAlert, FarmerRule::AssignedFarm),
    (ResourceKind::Account, FarmerRule::SelfOnly),
];

fn farmer_rule(kind: ResourceKind) -> FarmerRule {
    FARMER_RULES
        .iter()
        .find_map(|(candidate, rule)| (*candidate == kind).then_some(*rule))
        .unwrap_or(FarmerRule::Denied)
}

/// Resolve the scope of `principal` for `kind`.
///
/// # Examples
/// ```
/// use herdbook::domain::{Principal, ResourceKind, Role, Scope, UserId, resolve_scope};
///
/// let farmer = Principal { user_id: UserId::random(), role: Role::Farmer, assigned_farm: None };
/// assert_eq!(resolve_scope(&farmer, ResourceKind::Animal), Scope::Nothing);
/// ```
pub fn resolve_scope(principal: &Principal, kind: ResourceKind) -> Scope {
    match principal.role {
        Role::Admin => Scope::All,
        Role::Farmer => match farmer_rule(kind) {
            FarmerRule::AssignedFarm => principal
                .assigned_farm
                .map_or(Scope::Nothing, Scope::Farm),
            FarmerRule::SelfOnly => Scope::Account(principal.user_id),
            FarmerRule::Denied => Scope::Nothing,
        },
    }
}
