// src/utils/config.rs
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::utils::error::{ConfigError, MatcherError};

pub const ENV_FUZZY_THRESHOLD: &str = "DART_FUZZY_THRESHOLD";
pub const ENV_PRIMARY_ENCODING: &str = "DART_PRIMARY_ENCODING";
pub const ENV_FALLBACK_ENCODING: &str = "DART_FALLBACK_ENCODING";
pub const ENV_MAX_TEXT_CHARS: &str = "DART_MAX_TEXT_CHARS";
pub const ENV_PARSER_VERSION: &str = "DART_PARSER_VERSION";

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.90;
pub const DEFAULT_PRIMARY_ENCODING: &str = "utf-8";
pub const DEFAULT_FALLBACK_ENCODING: &str = "euc-kr";
// Keeps a single flattened record well under common document-store size limits.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;

/// Runtime knobs for loading, matching and record flattening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub fuzzy_threshold: f64,
    pub primary_encoding: String,
    pub fallback_encoding: String,
    pub max_text_chars: usize,
    pub parser_version: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            primary_encoding: DEFAULT_PRIMARY_ENCODING.to_string(),
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            parser_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Builds the configuration from `DART_*` environment variables, using
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FUZZY_THRESHOLD) {
            config.fuzzy_threshold = raw.trim().parse::<f64>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: ENV_FUZZY_THRESHOLD,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            tracing::debug!("Setting fuzzy threshold to {} from {}", config.fuzzy_threshold, ENV_FUZZY_THRESHOLD);
        } else {
            tracing::debug!("Using default fuzzy threshold {}", config.fuzzy_threshold);
        }

        if let Some(raw) = lookup(ENV_PRIMARY_ENCODING) {
            config.primary_encoding = raw.trim().to_string();
            tracing::debug!("Setting primary encoding to {} from {}", config.primary_encoding, ENV_PRIMARY_ENCODING);
        }

        if let Some(raw) = lookup(ENV_FALLBACK_ENCODING) {
            config.fallback_encoding = raw.trim().to_string();
            tracing::debug!("Setting fallback encoding to {} from {}", config.fallback_encoding, ENV_FALLBACK_ENCODING);
        }

        if let Some(raw) = lookup(ENV_MAX_TEXT_CHARS) {
            config.max_text_chars = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: ENV_MAX_TEXT_CHARS,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            tracing::debug!("Setting max text length to {} from {}", config.max_text_chars, ENV_MAX_TEXT_CHARS);
        }

        if let Some(raw) = lookup(ENV_PARSER_VERSION) {
            config.parser_version = raw.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and that both encoding labels are known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(MatcherError::InvalidThreshold(self.fuzzy_threshold).into());
        }
        self.encodings()?;
        Ok(())
    }

    /// Resolves the (primary, fallback) encoding labels.
    pub fn encodings(&self) -> Result<(&'static Encoding, &'static Encoding), ConfigError> {
        Ok((
            resolve_encoding(&self.primary_encoding)?,
            resolve_encoding(&self.fallback_encoding)?,
        ))
    }
}

pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
}
