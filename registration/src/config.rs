//! Registration settings loaded via OrthoConfig.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};

use crate::domain::{
    ControllerSettings, DEFAULT_ADMIN_EMAILS, DEFAULT_LOCATION_FALLBACK, ValidationPolicy,
};

const DEFAULT_STORAGE_DIR: &str = ".addex-storage";

/// Environment values holding a comma arrive as a list; a single address
/// arrives as a plain string.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmailList {
    One(String),
    Many(Vec<String>),
}

fn email_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<EmailList>::deserialize(deserializer)?.map(|list| match list {
            EmailList::One(email) => vec![email],
            EmailList::Many(emails) => emails,
        }),
    )
}

/// Runtime configuration for the registration subsystem.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADDEX")]
pub struct RegistrationSettings {
    /// Quiet period in milliseconds before a banking field is auto-saved.
    #[ortho_config(default = 500)]
    pub field_debounce_ms: u64,
    /// Quiet period in milliseconds before a draft snapshot is saved.
    #[ortho_config(default = 1000)]
    pub draft_debounce_ms: u64,
    /// Directory holding the file-backed store.
    pub storage_dir: Option<String>,
    /// Admin allow-list, comma-separated in the environment.
    #[serde(default, deserialize_with = "email_list")]
    pub admin_emails: Option<Vec<String>>,
    /// Location text shown when geolocation fails.
    pub location_fallback: Option<String>,
}

impl RegistrationSettings {
    /// Banking field debounce window.
    #[must_use]
    pub const fn field_debounce(&self) -> Duration {
        Duration::from_millis(self.field_debounce_ms)
    }

    /// Draft debounce window.
    #[must_use]
    pub const fn draft_debounce(&self) -> Duration {
        Duration::from_millis(self.draft_debounce_ms)
    }

    /// Storage directory, falling back to `.addex-storage`.
    #[must_use]
    pub fn storage_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.storage_dir.as_deref().unwrap_or(DEFAULT_STORAGE_DIR))
    }

    /// Admin allow-list entries, falling back to the built-in pair.
    ///
    /// A configured list with no non-blank entries also falls back.
    #[must_use]
    pub fn admin_emails(&self) -> Vec<String> {
        let configured: Vec<String> = self
            .admin_emails
            .iter()
            .flatten()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_owned)
            .collect();
        if configured.is_empty() {
            DEFAULT_ADMIN_EMAILS.iter().map(|email| (*email).to_owned()).collect()
        } else {
            configured
        }
    }

    /// Location fallback text, falling back to the default.
    #[must_use]
    pub fn location_fallback(&self) -> &str {
        self.location_fallback
            .as_deref()
            .unwrap_or(DEFAULT_LOCATION_FALLBACK)
    }

    /// Controller settings derived from this configuration.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            field_debounce: self.field_debounce(),
            draft_debounce: self.draft_debounce(),
            location_fallback: self.location_fallback().to_owned(),
            policy: ValidationPolicy::new(self.admin_emails()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for registration configuration parsing.

    use super::*;
    use crate::domain::{DEFAULT_DRAFT_DEBOUNCE, DEFAULT_FIELD_DEBOUNCE};
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "ADDEX_FIELD_DEBOUNCE_MS",
        "ADDEX_DRAFT_DEBOUNCE_MS",
        "ADDEX_STORAGE_DIR",
        "ADDEX_ADMIN_EMAILS",
        "ADDEX_LOCATION_FALLBACK",
    ];

    fn load_from_empty_args() -> RegistrationSettings {
        RegistrationSettings::load_from_iter([OsString::from("registration")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.field_debounce(), DEFAULT_FIELD_DEBOUNCE);
        assert_eq!(settings.draft_debounce(), DEFAULT_DRAFT_DEBOUNCE);
        assert_eq!(settings.storage_dir(), Utf8PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(
            settings.admin_emails(),
            ["admin@myonecard.ai", "superadmin@myonecard.ai"]
        );
        assert_eq!(settings.location_fallback(), DEFAULT_LOCATION_FALLBACK);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ADDEX_FIELD_DEBOUNCE_MS", Some("250".to_owned())),
            ("ADDEX_DRAFT_DEBOUNCE_MS", Some("750".to_owned())),
            ("ADDEX_STORAGE_DIR", Some("/tmp/addex".to_owned())),
            (
                "ADDEX_ADMIN_EMAILS",
                Some("ops@addex.example, ,root@addex.example".to_owned()),
            ),
            ("ADDEX_LOCATION_FALLBACK", Some("Soweto".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.field_debounce(), Duration::from_millis(250));
        assert_eq!(settings.draft_debounce(), Duration::from_millis(750));
        assert_eq!(settings.storage_dir(), Utf8PathBuf::from("/tmp/addex"));
        assert_eq!(
            settings.admin_emails(),
            ["ops@addex.example", "root@addex.example"]
        );

        let controller = settings.controller_settings();
        assert_eq!(controller.location_fallback, "Soweto");
        assert!(controller.policy.is_authorized_admin("root@addex.example"));
        assert!(!controller.policy.is_authorized_admin("admin@myonecard.ai"));
    }

    #[rstest]
    fn blank_allow_list_falls_back_to_defaults() {
        let mut guard_vars = VARS.map(|name| (name, None::<String>));
        guard_vars[3] = ("ADDEX_ADMIN_EMAILS", Some(" , ".to_owned()));
        let _guard = lock_env(guard_vars);

        let settings = load_from_empty_args();
        assert_eq!(settings.admin_emails().len(), 2);
    }

    #[rstest]
    #[case("ops@addex.example", &["ops@addex.example"])]
    #[case("ops@addex.example,root@addex.example", &["ops@addex.example", "root@addex.example"])]
    #[case(" Ops@Addex.example , ", &["Ops@Addex.example"])]
    fn allow_list_accepts_one_or_many_addresses(#[case] raw: &str, #[case] expected: &[&str]) {
        let mut guard_vars = VARS.map(|name| (name, None::<String>));
        guard_vars[3] = ("ADDEX_ADMIN_EMAILS", Some(raw.to_owned()));
        let _guard = lock_env(guard_vars);

        let settings = load_from_empty_args();
        assert_eq!(settings.admin_emails(), expected);
        assert_eq!(settings.field_debounce(), DEFAULT_FIELD_DEBOUNCE);
    }
}
