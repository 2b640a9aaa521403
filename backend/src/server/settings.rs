//! Application settings loaded once at startup via OrthoConfig.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use herdbook::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// East Africa Time.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;
const DEFAULT_NOTIFIER_FROM: &str = "herdbook@localhost";
const NOTIFIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Values read from `HERDBOOK_*` variables, CLI flags or a config file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HERDBOOK")]
pub struct AppSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub pool_size: Option<u32>,
    /// Offset from UTC used to decide what "today" is.
    pub utc_offset_minutes: Option<i32>,
    /// Mail relay endpoint. Without one notices are only logged.
    pub notifier_url: Option<String>,
    pub notifier_from: Option<String>,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Startup admin account requested by the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Settings that fail validation.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
    #[error("invalid notifier URL `{value}`: {message}")]
    NotifierUrl { value: String, message: String },
    #[error("admin bootstrap needs both a username and a password")]
    PartialAdmin,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self
            .utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset(minutes))
    }

    /// Pool settings when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref().map(str::trim)?;
        if url.is_empty() {
            return None;
        }
        let config = PoolConfig::new(url);
        Some(match self.pool_size {
            Some(size) => config.with_max_size(size),
            None => config,
        })
    }

    pub fn notifier_endpoint(&self) -> Result<Option<Url>, SettingsError> {
        let Some(value) = self.notifier_url.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }
        Url::parse(value)
            .map(Some)
            .map_err(|err| SettingsError::NotifierUrl {
                value: value.to_owned(),
                message: err.to_string(),
            })
    }

    pub fn notifier_from(&self) -> &str {
        self.notifier_from
            .as_deref()
            .unwrap_or(DEFAULT_NOTIFIER_FROM)
    }

    pub fn notifier_timeout(&self) -> Duration {
        NOTIFIER_TIMEOUT
    }

    /// Admin to create at startup, if requested.
    pub fn bootstrap_admin(&self) -> Result<Option<BootstrapAdmin>, SettingsError> {
        match (&self.admin_username, &self.admin_password) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => Ok(Some(BootstrapAdmin {
                username: username.clone(),
                email: self.admin_email.clone().unwrap_or_default(),
                password: password.clone(),
            })),
            _ => Err(SettingsError::PartialAdmin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "HERDBOOK_BIND_ADDR",
        "HERDBOOK_DATABASE_URL",
        "HERDBOOK_POOL_SIZE",
        "HERDBOOK_UTC_OFFSET_MINUTES",
        "HERDBOOK_NOTIFIER_URL",
        "HERDBOOK_NOTIFIER_FROM",
        "HERDBOOK_ADMIN_USERNAME",
        "HERDBOOK_ADMIN_EMAIL",
        "HERDBOOK_ADMIN_PASSWORD",
    ];

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("herdbook")]).expect("settings should load")
    }

    fn empty() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            pool_size: None,
            utc_offset_minutes: None,
            notifier_url: None,
            notifier_from: None,
            admin_username: None,
            admin_email: None,
            admin_password: None,
        }
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());
        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.utc_offset().expect("offset").local_minus_utc(),
            3 * 3600
        );
        assert!(settings.pool_config().is_none());
        assert!(settings.notifier_endpoint().expect("endpoint").is_none());
        assert_eq!(settings.notifier_from(), DEFAULT_NOTIFIER_FROM);
        assert_eq!(settings.bootstrap_admin().expect("admin"), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        for (name, value) in [
            ("HERDBOOK_BIND_ADDR", "127.0.0.1:9000"),
            ("HERDBOOK_DATABASE_URL", "postgres://localhost/herdbook"),
            ("HERDBOOK_POOL_SIZE", "4"),
            ("HERDBOOK_UTC_OFFSET_MINUTES", "0"),
            ("HERDBOOK_ADMIN_USERNAME", "root"),
            ("HERDBOOK_ADMIN_PASSWORD", "s3cret-pass"),
        ] {
            if let Some(slot) = vars.iter_mut().find(|(var, _)| *var == name) {
                slot.1 = Some(value.to_owned());
            }
        }
        let _guard = lock_env(vars);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert_eq!(
            settings.pool_config().expect("pool").database_url(),
            "postgres://localhost/herdbook"
        );
        assert_eq!(settings.utc_offset().expect("offset").local_minus_utc(), 0);
        let admin = settings.bootstrap_admin().expect("admin").expect("requested");
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "");
    }

    #[rstest]
    fn blank_database_url_means_memory_store() {
        let settings = AppSettings {
            database_url: Some("  ".to_owned()),
            ..empty()
        };
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    #[case(24 * 60)]
    #[case(-24 * 60)]
    #[case(i32::MAX)]
    fn offsets_beyond_a_day_are_rejected(#[case] minutes: i32) {
        let settings = AppSettings {
            utc_offset_minutes: Some(minutes),
            ..empty()
        };
        assert!(matches!(
            settings.utc_offset(),
            Err(SettingsError::UtcOffset(value)) if value == minutes
        ));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-addr".to_owned()),
            ..empty()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn malformed_notifier_url_is_reported() {
        let settings = AppSettings {
            notifier_url: Some("relay without scheme".to_owned()),
            ..empty()
        };
        assert!(matches!(
            settings.notifier_endpoint(),
            Err(SettingsError::NotifierUrl { .. })
        ));
    }

    #[rstest]
    #[case(Some("root"), None)]
    #[case(None, Some("s3cret-pass"))]
    fn half_configured_admin_is_rejected(
        #[case] username: Option<&str>,
        #[case] password: Option<&str>,
    ) {
        let settings = AppSettings {
            admin_username: username.map(str::to_owned),
            admin_password: password.map(str::to_owned),
            ..empty()
        };
        assert!(matches!(
            settings.bootstrap_admin(),
            Err(SettingsError::PartialAdmin)
        ));
    }
}
