//! Application-level configuration loading: admin accounts for the authority
//! boundary and the set of country rows seeded into storage.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "UNLOCK_MAP_BACK_CONFIG_PATH";
/// Environment variables that inject a single admin account without a file.
const ADMIN_TOKEN_ENV: &str = "UNLOCK_MAP_ADMIN_TOKEN";
const ADMIN_EMAIL_ENV: &str = "UNLOCK_MAP_ADMIN_EMAIL";

/// Role attached to a configured account. Only admins may mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Full access to the admin mutation endpoints.
    Admin,
    /// Recognised identity without mutation rights.
    Viewer,
}

/// A provisioned account resolvable from the `X-Admin-Token` header.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAccount {
    /// Opaque bearer token presented by the caller.
    pub token: String,
    /// Email recorded in the audit trail for this account.
    pub email: String,
    /// Role deciding between 200 and 403 on admin routes.
    pub role: AccountRole,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    accounts: Vec<AdminAccount>,
    countries: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in
    /// defaults, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        accounts = config.accounts.len(),
                        countries = config.countries.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(account) = account_from_env() {
            config.accounts.push(account);
        }
        if config.accounts.is_empty() {
            warn!("no admin accounts configured; admin endpoints will reject all requests");
        }

        config
    }

    /// Resolve a presented token to its configured account, if any.
    pub fn identify(&self, token: &str) -> Option<&AdminAccount> {
        self.accounts.iter().find(|account| account.token == token)
    }

    /// Country codes whose rows should exist in storage.
    pub fn seed_countries(&self) -> &[String] {
        &self.countries
    }

    #[cfg(test)]
    pub(crate) fn for_tests(accounts: Vec<AdminAccount>) -> Self {
        Self {
            accounts,
            countries: vec!["AU".into(), "BR".into(), "FR".into()],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            countries: default_countries(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    admins: Vec<AdminAccount>,
    #[serde(default)]
    countries: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let countries = if value.countries.is_empty() {
            default_countries()
        } else {
            value
                .countries
                .into_iter()
                .map(|code| code.to_ascii_uppercase())
                .collect()
        };
        Self {
            accounts: value.admins,
            countries,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Build an account from the token/email environment pair when both are set.
fn account_from_env() -> Option<AdminAccount> {
    let token = env::var(ADMIN_TOKEN_ENV).ok().filter(|t| !t.is_empty())?;
    let email = env::var(ADMIN_EMAIL_ENV)
        .ok()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "admin@localhost".into());
    Some(AdminAccount {
        token,
        email,
        role: AccountRole::Admin,
    })
}

/// ISO 3166-1 alpha-2 codes seeded by default (officially assigned set).
const ISO_ALPHA2: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// Built-in country set shipped with the binary.
fn default_countries() -> Vec<String> {
    ISO_ALPHA2.iter().map(|code| (*code).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_uppercases_country_codes() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "admins": [{"token": "t1", "email": "a@b.c", "role": "admin"}],
                 "countries": ["au", "fr"] }"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.seed_countries(), &["AU".to_string(), "FR".into()]);
        assert!(config.identify("t1").is_some());
        assert!(config.identify("nope").is_none());
    }

    #[test]
    fn empty_country_list_falls_back_to_iso_set() {
        let raw: RawConfig = serde_json::from_str(r#"{ "admins": [] }"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.seed_countries().len(), ISO_ALPHA2.len());
        assert!(config.seed_countries().contains(&"AU".to_string()));
    }

    #[test]
    fn viewer_role_parses() {
        let account: AdminAccount = serde_json::from_str(
            r#"{"token": "t", "email": "v@b.c", "role": "viewer"}"#,
        )
        .unwrap();
        assert_eq!(account.role, AccountRole::Viewer);
    }
}
