//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `SSO_*` environment variables and configuration files;
//! command-line flags belong to the `sso` binary itself.

use std::path::PathBuf;
use std::time::Duration;

use argon2::Params;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_TOKEN_TTL;
use crate::domain::ports::CredentialHasherError;
use crate::outbound::crypto::Argon2Hasher;

const DEFAULT_STATE_PATH: &str = "sso-state.json";

/// Invalid setting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Tokens must live for at least one second.
    #[error("token ttl must be positive")]
    ZeroTokenTtl,
}

/// Settings for the authentication service and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SSO")]
pub struct SsoSettings {
    /// Token lifetime in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Path of the JSON state file.
    pub state_path: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 iteration count.
    pub hash_iterations: Option<u32>,
    /// Argon2 lane count.
    pub hash_parallelism: Option<u32>,
}

impl SsoSettings {
    /// Configured token lifetime, falling back to one hour.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        match self.token_ttl_secs {
            None => Ok(DEFAULT_TOKEN_TTL),
            Some(0) => Err(SettingsError::ZeroTokenTtl),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    /// Configured state file, falling back to `sso-state.json`.
    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))
    }

    /// Password hasher using the configured Argon2 costs.
    ///
    /// Unset costs keep the Argon2 defaults.
    pub fn hasher(&self) -> Result<Argon2Hasher, CredentialHasherError> {
        if self.hash_memory_kib.is_none()
            && self.hash_iterations.is_none()
            && self.hash_parallelism.is_none()
        {
            return Ok(Argon2Hasher::default());
        }
        Argon2Hasher::with_params(
            self.hash_memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            self.hash_iterations.unwrap_or(Params::DEFAULT_T_COST),
            self.hash_parallelism.unwrap_or(Params::DEFAULT_P_COST),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 6] = [
        "SSO_TOKEN_TTL_SECS",
        "SSO_STATE_PATH",
        "SSO_JSON_LOGS",
        "SSO_HASH_MEMORY_KIB",
        "SSO_HASH_ITERATIONS",
        "SSO_HASH_PARALLELISM",
    ];

    fn load_from_empty_args() -> SsoSettings {
        SsoSettings::load_from_iter([OsString::from("sso")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(settings.token_ttl(), Ok(Duration::from_secs(3600)));
        assert_eq!(settings.state_path(), PathBuf::from("sso-state.json"));
        assert!(!settings.json_logs);
        assert!(settings.hasher().is_ok());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("SSO_TOKEN_TTL_SECS", "120"),
            ("SSO_STATE_PATH", "/tmp/sso/state.json"),
            ("SSO_JSON_LOGS", "true"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.token_ttl(), Ok(Duration::from_secs(120)));
        assert_eq!(settings.state_path(), PathBuf::from("/tmp/sso/state.json"));
        assert!(settings.json_logs);
    }

    #[rstest]
    fn zero_ttl_is_rejected() {
        let _guard = lock_env(env_with(&[("SSO_TOKEN_TTL_SECS", "0")]));

        let settings = load_from_empty_args();

        assert_eq!(settings.token_ttl(), Err(SettingsError::ZeroTokenTtl));
    }

    #[rstest]
    #[case("0", false)]
    #[case("1024", true)]
    fn hash_costs_are_validated(#[case] memory: &str, #[case] valid: bool) {
        let _guard = lock_env(env_with(&[
            ("SSO_HASH_MEMORY_KIB", memory),
            ("SSO_HASH_ITERATIONS", "1"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.hasher().is_ok(), valid);
    }
}
