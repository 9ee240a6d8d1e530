//! Client configuration and identity resolution.
//!
//! Identity and session parameters arrive on the embedding page's query
//! string. Missing required parameters are construction-time faults, raised
//! synchronously before any frame is sent.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{Error, Result};

// ============================================================================
// Platform
// ============================================================================

/// Host platform reported through the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Mobile client.
    Mobile,
    /// Desktop client.
    Desktop,
}

impl Platform {
    /// Parses the query-string value.
    fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "mobile" => Some(Self::Mobile),
            "desktop" => Some(Self::Desktop),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mobile => f.write_str("mobile"),
            Self::Desktop => f.write_str("desktop"),
        }
    }
}

// ============================================================================
// SdkConfig
// ============================================================================

/// Optional client behavior switches.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// When set, the console-capture sink is never armed on READY.
    pub disable_console_log_override: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            disable_console_log_override: false,
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Identity and session parameters resolved from the query string.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Hosting frame id (required).
    pub frame_id: String,
    /// Activity instance id (required).
    pub instance_id: String,
    /// Host platform (required).
    pub platform: Platform,
    /// Guild the activity runs in, when any.
    pub guild_id: Option<String>,
    /// Channel the activity runs in, when any.
    pub channel_id: Option<String>,
}

impl Identity {
    /// Resolves identity from a raw query string (with or without a leading
    /// `?`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `frame_id`, `instance_id`, or
    /// `platform` is missing, or when `platform` is not `mobile`/`desktop`.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut frame_id = None;
        let mut instance_id = None;
        let mut platform_raw = None;
        let mut guild_id = None;
        let mut channel_id = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "frame_id" => frame_id = Some(value.into_owned()),
                "instance_id" => instance_id = Some(value.into_owned()),
                "platform" => platform_raw = Some(value.into_owned()),
                "guild_id" => guild_id = Some(value.into_owned()),
                "channel_id" => channel_id = Some(value.into_owned()),
                _ => {}
            }
        }

        let frame_id = frame_id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config("frame_id query param is not defined"))?;
        let instance_id = instance_id
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config("instance_id query param is not defined"))?;
        let platform_raw = platform_raw
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config("platform query param is not defined"))?;
        let platform = Platform::from_query_value(&platform_raw).ok_or_else(|| {
            Error::config(format!(
                "Invalid query param \"platform\" of \"{platform_raw}\". \
                 Valid values are \"desktop\" or \"mobile\""
            ))
        })?;

        Ok(Self {
            frame_id,
            instance_id,
            platform,
            guild_id,
            channel_id,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
