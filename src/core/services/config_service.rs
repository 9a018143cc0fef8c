use crate::AppError;
use crate::api::client::DEFAULT_TIMEOUT_SECS;
use crate::core::panel::DEFAULT_LIMIT;
use crate::error::ConfigError;
use crate::storage::config::{Config, DEFAULT_API_URL, Profile};
use crate::utils::validation::{validate_limit, validate_timeout, validate_url};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Settings a query run actually uses, after layering flags over the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub api_url: String,
    pub default_limit: NonZeroU32,
    pub timeout_seconds: u64,
}

/// Configuration service for reading and editing profiles
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.config.get_profile(name)
    }

    /// Resolve settings for `profile`. `api_url_override` (flag or env) beats the profile.
    pub fn effective_settings(
        &self,
        profile: &str,
        api_url_override: Option<&str>,
    ) -> Result<EffectiveSettings, AppError> {
        let stored = self.get_profile(profile).cloned().unwrap_or_default();

        let api_url = api_url_override
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or(stored.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        validate_url(&api_url)?;

        let default_limit = match stored.default_limit {
            Some(limit) => validate_limit(limit)?,
            None => DEFAULT_LIMIT,
        };

        Ok(EffectiveSettings {
            api_url,
            default_limit,
            timeout_seconds: stored.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Set one user-facing field on a profile, creating the profile if needed
    pub fn set_profile_field(
        &mut self,
        profile: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        };

        let profile_entry = self.config.profiles.entry(profile.to_string()).or_default();

        match field {
            "api_url" => {
                validate_url(value)?;
                profile_entry.api_url = Some(value.trim_end_matches('/').to_string());
            }
            "default_limit" => {
                let limit = value
                    .parse::<u32>()
                    .map_err(|e| invalid(e.to_string()))?;
                profile_entry.default_limit = Some(validate_limit(limit)?.get());
            }
            "timeout_seconds" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|e| invalid(e.to_string()))?;
                profile_entry.timeout_seconds = Some(validate_timeout(secs)?);
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: field.to_string(),
                }
                .into());
            }
        }

        if self.config.default_profile.is_none() {
            self.config.default_profile = Some(profile.to_string());
        }

        Ok(())
    }

    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(AppError::from)
    }

    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        self.config.profiles.iter().collect()
    }
}
