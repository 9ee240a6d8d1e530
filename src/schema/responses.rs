//! Command response shapes.
//!
//! Every command response is validated against its per-command shape before
//! the awaiting caller is resolved; [`parse_response_data`] is the gate. A
//! command outside the dispatch table fails fast, mirroring the unknown-event
//! rule.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::Nonce;
use crate::schema::common::{
    Activity, Channel, ChannelType, Command, Entitlement, GuildMember, Message, Pan, Scope,
    ShortcutKey, Sku, UserVoiceState, VoiceSettings,
};

// ============================================================================
// Response Payload Shapes
// ============================================================================

/// AUTHORIZE response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeData {
    pub code: String,
}

/// User block on AUTHENTICATE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub discriminator: String,
    pub id: String,
    pub avatar: Option<String>,
    pub public_flags: i64,
}

/// Application block on AUTHENTICATE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedApplication {
    pub description: String,
    pub icon: Option<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_origins: Option<Vec<String>>,
    pub name: String,
}

/// AUTHENTICATE response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateData {
    pub access_token: String,
    pub user: AuthenticatedUser,
    pub scopes: Vec<Scope>,
    pub expires: String,
    pub application: AuthenticatedApplication,
}

/// Guild summary on GET_GUILDS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildSummary {
    pub id: String,
    pub name: String,
}

/// GET_GUILDS response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGuildsData {
    pub guilds: Vec<GuildSummary>,
}

/// GET_GUILD response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGuildData {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub members: Vec<GuildMember>,
}

/// GET_CHANNEL response; also the payload of the channel-select commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDetail {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub bitrate: Option<i64>,
    #[serde(default)]
    pub user_limit: Option<i64>,
    #[serde(default)]
    pub position: Option<i64>,
    pub voice_states: Vec<UserVoiceState>,
    pub messages: Vec<Message>,
}

/// GET_CHANNELS response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChannelsData {
    pub channels: Vec<Channel>,
}

/// SET_USER_VOICE_SETTINGS response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserVoiceSettingsData {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Pan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

/// SUBSCRIBE / UNSUBSCRIBE acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeData {
    pub evt: String,
}

/// CAPTURE_SHORTCUT response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureShortcutData {
    pub shortcut: ShortcutKey,
}

/// GET_SKUS_EMBEDDED response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSkusData {
    pub skus: Vec<Sku>,
}

/// GET_ENTITLEMENTS_EMBEDDED response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEntitlementsData {
    pub entitlements: Vec<Entitlement>,
}

/// SET_CONFIG response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfigData {
    pub use_interactive_pip: bool,
}

/// USER_SETTINGS_GET_LOCALE response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleData {
    pub locale: String,
}

/// ENCOURAGE_HW_ACCELERATION response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareAccelerationData {
    pub enabled: bool,
}

/// GET_CHANNEL_PERMISSIONS response.
///
/// Permissions arrive as a decimal string too wide for a u64; see
/// [`crate::flags`] for the big-flag helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPermissionsData {
    pub permissions: Value,
}

impl ChannelPermissionsData {
    /// Decodes the permission bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the value is neither a decimal string
    /// nor an integer.
    pub fn permission_flags(&self) -> Result<u128> {
        crate::flags::parse_big_flags(&self.permissions)
            .map_err(|e| Error::schema("GET_CHANNEL_PERMISSIONS", e))
    }
}

/// INITIATE_IMAGE_UPLOAD response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadData {
    pub image_url: String,
}

/// GET_PLATFORM_BEHAVIORS response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBehaviorsData {
    #[serde(
        rename = "iosKeyboardResizesView",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ios_keyboard_resizes_view: Option<bool>,
}

// ============================================================================
// ResponseData
// ============================================================================

/// A validated command response, payload typed by command.
#[derive(Debug, Clone)]
pub enum ResponseData {
    /// Acknowledgement-only commands (`{}` or `null` on the wire).
    Empty,
    Authorize(AuthorizeData),
    Authenticate(AuthenticateData),
    GetGuilds(GetGuildsData),
    GetGuild(GetGuildData),
    GetChannel(ChannelDetail),
    GetChannels(GetChannelsData),
    SetUserVoiceSettings(UserVoiceSettingsData),
    SelectVoiceChannel(Option<ChannelDetail>),
    GetSelectedVoiceChannel(Option<ChannelDetail>),
    SelectTextChannel(Option<ChannelDetail>),
    VoiceSettings(VoiceSettings),
    Subscribe(SubscribeData),
    CaptureShortcut(CaptureShortcutData),
    SetActivity(Activity),
    GetSkus(GetSkusData),
    GetEntitlements(GetEntitlementsData),
    StartPurchase(Option<Vec<Entitlement>>),
    SetConfig(SetConfigData),
    UserSettingsGetLocale(LocaleData),
    EncourageHardwareAcceleration(HardwareAccelerationData),
    GetChannelPermissions(ChannelPermissionsData),
    InitiateImageUpload(Option<ImageUploadData>),
    GetPlatformBehaviors(PlatformBehaviorsData),
}

/// A classified, validated command response.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    /// Echoed command name.
    pub cmd: Command,
    /// Validated payload.
    pub data: ResponseData,
    /// Echoed correlation nonce; a response without one cannot be routed.
    pub nonce: Option<Nonce>,
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_data<T: serde::de::DeserializeOwned>(cmd: Command, data: &Value) -> Result<T> {
    serde_json::from_value(data.clone()).map_err(|e| Error::schema(cmd.as_str(), e.to_string()))
}

fn parse_empty(cmd: Command, data: &Value) -> Result<ResponseData> {
    match data {
        Value::Null | Value::Object(_) => Ok(ResponseData::Empty),
        _ => Err(Error::schema(cmd.as_str(), "expected empty object or null")),
    }
}

/// Validates a command response's payload against its declared shape.
///
/// # Errors
///
/// Returns [`Error::Schema`] on shape mismatch and [`Error::Protocol`] for
/// commands with no response shape in the dispatch table. Either way the
/// failure resolves the awaiting caller, never a silent drop.
pub fn parse_response_data(cmd: Command, data: &Value) -> Result<ResponseData> {
    Ok(match cmd {
        Command::Authorize => ResponseData::Authorize(parse_data(cmd, data)?),
        Command::Authenticate => ResponseData::Authenticate(parse_data(cmd, data)?),
        Command::GetGuilds => ResponseData::GetGuilds(parse_data(cmd, data)?),
        Command::GetGuild => ResponseData::GetGuild(parse_data(cmd, data)?),
        Command::GetChannel => ResponseData::GetChannel(parse_data(cmd, data)?),
        Command::GetChannels => ResponseData::GetChannels(parse_data(cmd, data)?),
        Command::SetUserVoiceSettings => {
            ResponseData::SetUserVoiceSettings(parse_data(cmd, data)?)
        }
        Command::SelectVoiceChannel => ResponseData::SelectVoiceChannel(parse_data(cmd, data)?),
        Command::GetSelectedVoiceChannel => {
            ResponseData::GetSelectedVoiceChannel(parse_data(cmd, data)?)
        }
        Command::SelectTextChannel => ResponseData::SelectTextChannel(parse_data(cmd, data)?),
        Command::GetVoiceSettings | Command::SetVoiceSettings => {
            ResponseData::VoiceSettings(parse_data(cmd, data)?)
        }
        Command::Subscribe | Command::Unsubscribe => {
            ResponseData::Subscribe(parse_data(cmd, data)?)
        }
        Command::CaptureShortcut => ResponseData::CaptureShortcut(parse_data(cmd, data)?),
        Command::SetActivity => ResponseData::SetActivity(parse_data(cmd, data)?),
        Command::GetSkusEmbedded => ResponseData::GetSkus(parse_data(cmd, data)?),
        Command::GetEntitlementsEmbedded => {
            ResponseData::GetEntitlements(parse_data(cmd, data)?)
        }
        Command::StartPurchase => ResponseData::StartPurchase(parse_data(cmd, data)?),
        Command::SetConfig => ResponseData::SetConfig(parse_data(cmd, data)?),
        Command::UserSettingsGetLocale => {
            ResponseData::UserSettingsGetLocale(parse_data(cmd, data)?)
        }
        Command::EncourageHwAcceleration => {
            ResponseData::EncourageHardwareAcceleration(parse_data(cmd, data)?)
        }
        Command::GetChannelPermissions => {
            ResponseData::GetChannelPermissions(parse_data(cmd, data)?)
        }
        Command::InitiateImageUpload => ResponseData::InitiateImageUpload(parse_data(cmd, data)?),
        Command::GetPlatformBehaviors => {
            ResponseData::GetPlatformBehaviors(parse_data(cmd, data)?)
        }
        Command::StartPremiumPurchase
        | Command::OpenExternalLink
        | Command::SetOrientationLockState
        | Command::SetCertifiedDevices
        | Command::SendAnalyticsEvent
        | Command::OpenInviteDialog
        | Command::CaptureLog
        | Command::OpenShareMomentDialog => parse_empty(cmd, data)?,
        // Legacy desktop-only commands with no embedded response shape.
        Command::GetSkus | Command::GetEntitlements => {
            return Err(Error::protocol(format!("Unrecognized command {cmd}")));
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_authorize() {
        let parsed =
            parse_response_data(Command::Authorize, &json!({"code": "abc123"})).expect("parse");
        let ResponseData::Authorize(data) = parsed else {
            panic!("expected AUTHORIZE variant");
        };
        assert_eq!(data.code, "abc123");
    }

    #[test]
    fn test_parse_empty_accepts_null_and_object() {
        assert!(matches!(
            parse_response_data(Command::OpenInviteDialog, &Value::Null).expect("null"),
            ResponseData::Empty
        ));
        assert!(matches!(
            parse_response_data(Command::CaptureLog, &json!({})).expect("object"),
            ResponseData::Empty
        ));
        let err = parse_response_data(Command::CaptureLog, &json!("done"));
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_nullable_channel() {
        let parsed = parse_response_data(Command::GetSelectedVoiceChannel, &Value::Null)
            .expect("null channel");
        assert!(matches!(parsed, ResponseData::GetSelectedVoiceChannel(None)));
    }

    #[test]
    fn test_parse_shape_mismatch_is_schema_error() {
        let err = parse_response_data(Command::Authorize, &json!({"token": "nope"}))
            .expect_err("wrong field");
        assert!(matches!(err, Error::Schema { .. }));
        assert!(err.to_string().contains("AUTHORIZE"));
    }

    #[test]
    fn test_parse_legacy_commands_fail_fast() {
        let err = parse_response_data(Command::GetSkus, &json!({"skus": []}))
            .expect_err("legacy command");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_channel_permissions_flags() {
        let data = ChannelPermissionsData {
            permissions: json!("1071698529857"),
        };
        assert_eq!(data.permission_flags().expect("decimal string"), 1_071_698_529_857);

        let data = ChannelPermissionsData {
            permissions: json!(2048),
        };
        assert_eq!(data.permission_flags().expect("integer"), 2048);

        let data = ChannelPermissionsData {
            permissions: json!({"allow": "1"}),
        };
        assert!(data.permission_flags().is_err());
    }

    #[test]
    fn test_platform_behaviors_camel_case_key() {
        let parsed = parse_response_data(
            Command::GetPlatformBehaviors,
            &json!({"iosKeyboardResizesView": true}),
        )
        .expect("parse");
        let ResponseData::GetPlatformBehaviors(data) = parsed else {
            panic!("expected platform behaviors variant");
        };
        assert_eq!(data.ios_keyboard_resizes_view, Some(true));
    }
}
