//! Restock alerts raised when feed runs out.
//!
//! Alerts are only ever created by the inventory workflow. At most one
//! unresolved alert exists per (farm, item name); raising a duplicate
//! returns the open alert instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::accounts::{Account, UserId};
use super::farm::Farm;
use super::notice::{Notice, escape_html};

/// Category of stock that triggered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    CowFeed,
    ChickenFeed,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CowFeed => "cow_feed",
            Self::ChickenFeed => "chicken_feed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cow_feed" => Some(Self::CowFeed),
            "chicken_feed" => Some(Self::ChickenFeed),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CowFeed => "Cow Feed",
            Self::ChickenFeed => "Chicken Feed",
        }
    }
}

/// A persisted restock alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RestockAlert {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub alert_type: AlertType,
    pub item_name: String,
    pub message: String,
    pub is_resolved: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Alert about to be raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockAlertDraft {
    pub farm_id: Uuid,
    pub alert_type: AlertType,
    pub item_name: String,
    pub message: String,
    pub created_by: UserId,
}

impl RestockAlertDraft {
    /// Draft for a feed that has just been marked finished.
    pub fn for_depleted_feed(
        farm: &Farm,
        alert_type: AlertType,
        item_name: &str,
        created_by: UserId,
    ) -> Self {
        Self {
            farm_id: farm.id,
            alert_type,
            item_name: item_name.to_owned(),
            message: format!(
                "{item_name} is finished and needs restocking at {}",
                farm.name
            ),
            created_by,
        }
    }

    /// Materialise the draft as a new, unresolved alert.
    pub fn into_alert(self, id: Uuid, created_at: DateTime<Utc>) -> RestockAlert {
        RestockAlert {
            id,
            farm_id: self.farm_id,
            alert_type: self.alert_type,
            item_name: self.item_name,
            message: self.message,
            is_resolved: false,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// Everything needed to tell admins about an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertContext {
    pub alert: RestockAlert,
    pub farm: Farm,
    /// Account that triggered the alert, if it still exists.
    pub reporter: Option<Account>,
}

impl AlertContext {
    /// Render the admin notification for this alert.
    pub fn notice(&self, recipients: Vec<String>) -> Notice {
        let alert = &self.alert;
        let farm = &self.farm;
        let subject = format!("URGENT: {} Stock Alert - {}", alert.item_name, farm.name);
        let when = alert.created_at.format("%Y-%m-%d %H:%M:%S UTC");
        let reporter = self.reporter.as_ref().map_or_else(
            || "Unknown user".to_owned(),
            |account| format!("{} ({})", account.display_name(), account.username),
        );
        let phone = self
            .reporter
            .as_ref()
            .map(|account| account.phone.as_str())
            .filter(|phone| !phone.is_empty())
            .unwrap_or("Not provided");
        let email = self
            .reporter
            .as_ref()
            .map_or("Not provided", |account| account.email.as_str());

        let text = format!(
            "STOCK ALERT\n\n\
             URGENT RESTOCK REQUIRED\n\n\
             Farm: {} ({})\n\
             Item: {}\n\
             Alert Type: {}\n\
             Date/Time: {when}\n\
             Reported By: {reporter}\n\n\
             DETAILS:\n{}\n\n\
             ACTION REQUIRED:\n\
             - Contact your supplier immediately\n\
             - Update inventory once restocked\n\
             - Monitor consumption patterns\n\n\
             CONTACT:\n\
             Phone: {phone}\n\
             Email: {email}\n\n\
             Automated Alert #{}\n",
            farm.name,
            farm.location,
            alert.item_name,
            alert.alert_type.display_name(),
            alert.message,
            alert.id,
        );

        let row = |label: &str, value: &str| {
            format!(
                "<tr><td><strong>{label}:</strong></td><td>{}</td></tr>",
                escape_html(value)
            )
        };
        let html = format!(
            "<html><body>\
             <h2>URGENT STOCK ALERT</h2>\
             <h3>Restock Required Immediately</h3>\
             <table>{}{}{}{}{}</table>\
             <h4>Details:</h4><p>{}</p>\
             <h4>Action Required:</h4>\
             <ul><li>Contact your supplier immediately</li>\
             <li>Update inventory once restocked</li>\
             <li>Monitor consumption patterns</li></ul>\
             <p><strong>Phone:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p>Automated Alert #{}</p>\
             </body></html>",
            row("Farm", &format!("{} ({})", farm.name, farm.location)),
            row("Item", &alert.item_name),
            row("Alert Type", alert.alert_type.display_name()),
            row("Date/Time", &when.to_string()),
            row("Reported By", &reporter),
            escape_html(&alert.message),
            escape_html(phone),
            escape_html(email),
            alert.id,
        );

        Notice::plain(recipients, subject, text).with_html(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::Role;
    use rstest::{fixture, rstest};

    #[fixture]
    fn farm() -> Farm {
        Farm {
            id: Uuid::new_v4(),
            name: "Kiambu Dairy".to_owned(),
            location: "Kiambu".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn reporter() -> Account {
        Account {
            id: UserId::random(),
            username: "wanjiru".to_owned(),
            email: "wanjiru@example.com".to_owned(),
            first_name: "Wanjiru".to_owned(),
            last_name: "Kamau".to_owned(),
            role: Role::Farmer,
            assigned_farm: None,
            phone: String::new(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn depleted_feed_message_names_item_and_farm(farm: Farm) {
        let draft = RestockAlertDraft::for_depleted_feed(
            &farm,
            AlertType::CowFeed,
            "Dairy Meal",
            UserId::random(),
        );
        assert_eq!(
            draft.message,
            "Dairy Meal is finished and needs restocking at Kiambu Dairy"
        );
        let alert = draft.into_alert(Uuid::new_v4(), Utc::now());
        assert!(!alert.is_resolved);
    }

    #[rstest]
    fn notice_carries_subject_and_details(farm: Farm) {
        let account = reporter();
        let alert = RestockAlertDraft::for_depleted_feed(
            &farm,
            AlertType::ChickenFeed,
            "Layers <Mash>",
            account.id,
        )
        .into_alert(Uuid::new_v4(), Utc::now());
        let context = AlertContext {
            alert,
            farm,
            reporter: Some(account),
        };
        let notice = context.notice(vec!["admin@example.com".to_owned()]);
        assert_eq!(notice.subject, "URGENT: Layers <Mash> Stock Alert - Kiambu Dairy");
        assert!(notice.text.contains("Farm: Kiambu Dairy (Kiambu)"));
        assert!(notice.text.contains("Alert Type: Chicken Feed"));
        assert!(notice.text.contains("Reported By: Wanjiru Kamau (wanjiru)"));
        assert!(notice.text.contains("Phone: Not provided"));
        let html = notice.html.expect("html body");
        assert!(html.contains("Layers &lt;Mash&gt;"));
    }
}
