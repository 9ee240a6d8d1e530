//! Pushed-event names and payload shapes.
//!
//! Inbound FRAME payloads with a non-null `evt` slot are pushed events. Each
//! known event has a declared payload shape; [`parse_event_payload`] is the
//! single validation gate the dispatcher runs before any listener sees data.
//!
//! An unknown `evt` is a protocol contract violation and fails fast, unlike a
//! known event whose payload fails validation (logged and dropped upstream).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::common::{
    ChannelType, Entitlement, Guild, LayoutMode, Message, Orientation, OrientationState,
    Pan, ShortcutKey, ThermalState, User, VoiceSettings, VoiceState, open_int_enum,
    open_string_enum,
};

// ============================================================================
// EventName
// ============================================================================

/// Pseudo-event name that routes remote errors; never subscribable.
pub const ERROR_EVENT: &str = "ERROR";

/// Pushed-event names (closed set).
///
/// [`EventName::Ready`] is the one member that is never put on the wire in a
/// subscribe request: the host pushes it unconditionally after the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    Ready,
    GuildStatus,
    GuildCreate,
    ChannelCreate,
    VoiceChannelSelect,
    VoiceSettingsUpdate,
    VoiceStateCreate,
    VoiceStateUpdate,
    VoiceStateDelete,
    VoiceConnectionStatus,
    MessageCreate,
    MessageUpdate,
    MessageDelete,
    SpeakingStart,
    SpeakingStop,
    NotificationCreate,
    CaptureShortcutChange,
    ActivityJoin,
    ActivityJoinRequest,
    ActivityPipModeUpdate,
    ActivityLayoutModeUpdate,
    OrientationUpdate,
    CurrentUserUpdate,
    EntitlementCreate,
    ThermalStateUpdate,
}

impl EventName {
    /// Parses a wire event name.
    ///
    /// Returns `None` for names outside the closed set (including `ERROR`,
    /// which is routed before event parsing).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::from(name)).ok()
    }

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::GuildStatus => "GUILD_STATUS",
            Self::GuildCreate => "GUILD_CREATE",
            Self::ChannelCreate => "CHANNEL_CREATE",
            Self::VoiceChannelSelect => "VOICE_CHANNEL_SELECT",
            Self::VoiceSettingsUpdate => "VOICE_SETTINGS_UPDATE",
            Self::VoiceStateCreate => "VOICE_STATE_CREATE",
            Self::VoiceStateUpdate => "VOICE_STATE_UPDATE",
            Self::VoiceStateDelete => "VOICE_STATE_DELETE",
            Self::VoiceConnectionStatus => "VOICE_CONNECTION_STATUS",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::SpeakingStart => "SPEAKING_START",
            Self::SpeakingStop => "SPEAKING_STOP",
            Self::NotificationCreate => "NOTIFICATION_CREATE",
            Self::CaptureShortcutChange => "CAPTURE_SHORTCUT_CHANGE",
            Self::ActivityJoin => "ACTIVITY_JOIN",
            Self::ActivityJoinRequest => "ACTIVITY_JOIN_REQUEST",
            Self::ActivityPipModeUpdate => "ACTIVITY_PIP_MODE_UPDATE",
            Self::ActivityLayoutModeUpdate => "ACTIVITY_LAYOUT_MODE_UPDATE",
            Self::OrientationUpdate => "ORIENTATION_UPDATE",
            Self::CurrentUserUpdate => "CURRENT_USER_UPDATE",
            Self::EntitlementCreate => "ENTITLEMENT_CREATE",
            Self::ThermalStateUpdate => "THERMAL_STATE_UPDATE",
        }
    }

    /// Whether subscribing to this event involves the remote end at all.
    ///
    /// READY fires exactly once, driven by the handshake rather than a
    /// SUBSCRIBE exchange, so it is registered locally only.
    #[inline]
    #[must_use]
    pub fn is_remote_subscribable(&self) -> bool {
        !matches!(self, Self::Ready)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event-Specific Enumerations
// ============================================================================

open_string_enum! {
    /// Voice connection lifecycle state.
    VoiceConnectionState {
        Disconnected => "DISCONNECTED",
        AwaitingEndpoint => "AWAITING_ENDPOINT",
        Authenticating => "AUTHENTICATING",
        Connecting => "CONNECTING",
        Connected => "CONNECTED",
        VoiceDisconnected => "VOICE_DISCONNECTED",
        VoiceConnecting => "VOICE_CONNECTING",
        VoiceConnected => "VOICE_CONNECTED",
        NoRoute => "NO_ROUTE",
        IceChecking => "ICE_CHECKING",
    }
}

open_int_enum! {
    /// Why an activity join was initiated.
    ActivityIntent {
        Play => 0,
        Spectate => 1,
    }
}

// ============================================================================
// Event Payload Shapes
// ============================================================================

/// Host environment block on READY.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_host: Option<String>,
    pub api_endpoint: String,
    pub environment: String,
}

/// Abbreviated user block on READY.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyUser {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// READY payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyData {
    pub v: i64,
    pub config: ReadyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReadyUser>,
}

/// GUILD_STATUS payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildStatusData {
    pub guild: Guild,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<f64>,
}

/// GUILD_CREATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildCreateData {
    pub id: String,
    pub name: String,
}

/// CHANNEL_CREATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCreateData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
}

/// VOICE_CHANNEL_SELECT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceChannelSelectData {
    pub channel_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// VOICE_SETTINGS_UPDATE payload.
///
/// The settings block arrives nested under a `data` key inside the event
/// payload; this mirrors the wire, nesting and all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettingsUpdateData {
    pub data: VoiceSettings,
}

/// VOICE_STATE_CREATE / VOICE_STATE_UPDATE / VOICE_STATE_DELETE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceStateChangeData {
    pub voice_state: VoiceState,
    pub user: User,
    pub nick: String,
    pub volume: f64,
    pub mute: bool,
    pub pan: Pan,
}

/// VOICE_CONNECTION_STATUS payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConnectionStatusData {
    pub state: VoiceConnectionState,
    pub hostname: String,
    pub pings: Vec<f64>,
    pub average_ping: f64,
    pub last_ping: f64,
}

/// MESSAGE_CREATE / MESSAGE_UPDATE / MESSAGE_DELETE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageChangeData {
    pub channel_id: String,
    pub message: Message,
}

/// SPEAKING_START / SPEAKING_STOP payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakingData {
    pub user_id: String,
}

/// NOTIFICATION_CREATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreateData {
    pub channel_id: String,
    pub message: Message,
    pub icon_url: String,
    pub title: String,
    pub body: String,
}

/// CAPTURE_SHORTCUT_CHANGE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureShortcutChangeData {
    pub shortcut: ShortcutKey,
}

/// ACTIVITY_JOIN payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityJoinData {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<ActivityIntent>,
}

/// ACTIVITY_JOIN_REQUEST payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityJoinRequestData {
    pub user: User,
}

/// ACTIVITY_PIP_MODE_UPDATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPipModeUpdateData {
    pub is_pip_mode: bool,
}

/// ACTIVITY_LAYOUT_MODE_UPDATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLayoutModeUpdateData {
    pub layout_mode: LayoutMode,
}

/// ORIENTATION_UPDATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationUpdateData {
    pub screen_orientation: OrientationState,
    pub orientation: Orientation,
}

/// CURRENT_USER_UPDATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserUpdateData {
    #[serde(default)]
    pub avatar: Option<String>,
    pub bot: bool,
    pub discriminator: String,
    #[serde(default)]
    pub flags: Option<i64>,
    pub id: String,
    #[serde(default)]
    pub premium_type: Option<i64>,
    pub username: String,
}

/// ENTITLEMENT_CREATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementCreateData {
    pub entitlement: Entitlement,
}

/// THERMAL_STATE_UPDATE payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalStateUpdateData {
    pub thermal_state: ThermalState,
}

// ============================================================================
// EventData
// ============================================================================

/// A validated pushed event, payload typed by event name.
#[derive(Debug, Clone)]
pub enum EventData {
    Ready(ReadyData),
    GuildStatus(GuildStatusData),
    GuildCreate(GuildCreateData),
    ChannelCreate(ChannelCreateData),
    VoiceChannelSelect(VoiceChannelSelectData),
    VoiceSettingsUpdate(VoiceSettingsUpdateData),
    VoiceStateCreate(VoiceStateChangeData),
    VoiceStateUpdate(VoiceStateChangeData),
    VoiceStateDelete(VoiceStateChangeData),
    VoiceConnectionStatus(VoiceConnectionStatusData),
    MessageCreate(MessageChangeData),
    MessageUpdate(MessageChangeData),
    MessageDelete(MessageChangeData),
    SpeakingStart(SpeakingData),
    SpeakingStop(SpeakingData),
    NotificationCreate(NotificationCreateData),
    CaptureShortcutChange(CaptureShortcutChangeData),
    ActivityJoin(ActivityJoinData),
    ActivityJoinRequest(ActivityJoinRequestData),
    ActivityPipModeUpdate(ActivityPipModeUpdateData),
    ActivityLayoutModeUpdate(ActivityLayoutModeUpdateData),
    OrientationUpdate(OrientationUpdateData),
    CurrentUserUpdate(CurrentUserUpdateData),
    EntitlementCreate(EntitlementCreateData),
    ThermalStateUpdate(ThermalStateUpdateData),
}

impl EventData {
    /// Returns the event's name.
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::Ready(_) => EventName::Ready,
            Self::GuildStatus(_) => EventName::GuildStatus,
            Self::GuildCreate(_) => EventName::GuildCreate,
            Self::ChannelCreate(_) => EventName::ChannelCreate,
            Self::VoiceChannelSelect(_) => EventName::VoiceChannelSelect,
            Self::VoiceSettingsUpdate(_) => EventName::VoiceSettingsUpdate,
            Self::VoiceStateCreate(_) => EventName::VoiceStateCreate,
            Self::VoiceStateUpdate(_) => EventName::VoiceStateUpdate,
            Self::VoiceStateDelete(_) => EventName::VoiceStateDelete,
            Self::VoiceConnectionStatus(_) => EventName::VoiceConnectionStatus,
            Self::MessageCreate(_) => EventName::MessageCreate,
            Self::MessageUpdate(_) => EventName::MessageUpdate,
            Self::MessageDelete(_) => EventName::MessageDelete,
            Self::SpeakingStart(_) => EventName::SpeakingStart,
            Self::SpeakingStop(_) => EventName::SpeakingStop,
            Self::NotificationCreate(_) => EventName::NotificationCreate,
            Self::CaptureShortcutChange(_) => EventName::CaptureShortcutChange,
            Self::ActivityJoin(_) => EventName::ActivityJoin,
            Self::ActivityJoinRequest(_) => EventName::ActivityJoinRequest,
            Self::ActivityPipModeUpdate(_) => EventName::ActivityPipModeUpdate,
            Self::ActivityLayoutModeUpdate(_) => EventName::ActivityLayoutModeUpdate,
            Self::OrientationUpdate(_) => EventName::OrientationUpdate,
            Self::CurrentUserUpdate(_) => EventName::CurrentUserUpdate,
            Self::EntitlementCreate(_) => EventName::EntitlementCreate,
            Self::ThermalStateUpdate(_) => EventName::ThermalStateUpdate,
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_data<T: serde::de::DeserializeOwned>(evt: EventName, data: &Value) -> Result<T> {
    serde_json::from_value(data.clone()).map_err(|e| Error::schema(evt.as_str(), e.to_string()))
}

/// Validates a pushed event's payload against its declared shape.
///
/// # Errors
///
/// Returns [`Error::Schema`] when `data` does not satisfy the event's shape.
/// The dispatcher logs and drops that; listeners never observe invalid data.
pub fn parse_event_payload(evt: EventName, data: &Value) -> Result<EventData> {
    Ok(match evt {
        EventName::Ready => EventData::Ready(parse_data(evt, data)?),
        EventName::GuildStatus => EventData::GuildStatus(parse_data(evt, data)?),
        EventName::GuildCreate => EventData::GuildCreate(parse_data(evt, data)?),
        EventName::ChannelCreate => EventData::ChannelCreate(parse_data(evt, data)?),
        EventName::VoiceChannelSelect => EventData::VoiceChannelSelect(parse_data(evt, data)?),
        EventName::VoiceSettingsUpdate => EventData::VoiceSettingsUpdate(parse_data(evt, data)?),
        EventName::VoiceStateCreate => EventData::VoiceStateCreate(parse_data(evt, data)?),
        EventName::VoiceStateUpdate => EventData::VoiceStateUpdate(parse_data(evt, data)?),
        EventName::VoiceStateDelete => EventData::VoiceStateDelete(parse_data(evt, data)?),
        EventName::VoiceConnectionStatus => {
            EventData::VoiceConnectionStatus(parse_data(evt, data)?)
        }
        EventName::MessageCreate => EventData::MessageCreate(parse_data(evt, data)?),
        EventName::MessageUpdate => EventData::MessageUpdate(parse_data(evt, data)?),
        EventName::MessageDelete => EventData::MessageDelete(parse_data(evt, data)?),
        EventName::SpeakingStart => EventData::SpeakingStart(parse_data(evt, data)?),
        EventName::SpeakingStop => EventData::SpeakingStop(parse_data(evt, data)?),
        EventName::NotificationCreate => EventData::NotificationCreate(parse_data(evt, data)?),
        EventName::CaptureShortcutChange => {
            EventData::CaptureShortcutChange(parse_data(evt, data)?)
        }
        EventName::ActivityJoin => EventData::ActivityJoin(parse_data(evt, data)?),
        EventName::ActivityJoinRequest => EventData::ActivityJoinRequest(parse_data(evt, data)?),
        EventName::ActivityPipModeUpdate => {
            EventData::ActivityPipModeUpdate(parse_data(evt, data)?)
        }
        EventName::ActivityLayoutModeUpdate => {
            EventData::ActivityLayoutModeUpdate(parse_data(evt, data)?)
        }
        EventName::OrientationUpdate => EventData::OrientationUpdate(parse_data(evt, data)?),
        EventName::CurrentUserUpdate => EventData::CurrentUserUpdate(parse_data(evt, data)?),
        EventName::EntitlementCreate => EventData::EntitlementCreate(parse_data(evt, data)?),
        EventName::ThermalStateUpdate => EventData::ThermalStateUpdate(parse_data(evt, data)?),
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
    fn test_event_name_wire_round_trip() {
        for evt in [
            EventName::Ready,
            EventName::ActivityLayoutModeUpdate,
            EventName::VoiceConnectionStatus,
            EventName::ThermalStateUpdate,
        ] {
            assert_eq!(EventName::parse(evt.as_str()), Some(evt));
        }
        assert_eq!(EventName::parse("NOT_AN_EVENT"), None);
        // ERROR is a routing marker, not an event.
        assert_eq!(EventName::parse(ERROR_EVENT), None);
    }

    #[test]
    fn test_ready_is_not_remote_subscribable() {
        assert!(!EventName::Ready.is_remote_subscribable());
        assert!(EventName::SpeakingStart.is_remote_subscribable());
    }

    #[test]
    fn test_parse_ready_payload() {
        let data = json!({
            "v": 1,
            "config": {
                "api_endpoint": "//api.example.com",
                "environment": "production",
            },
        });
        let parsed = parse_event_payload(EventName::Ready, &data).expect("parse");
        let EventData::Ready(ready) = parsed else {
            panic!("expected READY variant");
        };
        assert_eq!(ready.v, 1);
        assert!(ready.config.cdn_host.is_none());
        assert!(ready.user.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let err = parse_event_payload(EventName::SpeakingStart, &json!({"user": "not-an-id"}))
            .expect_err("missing user_id");
        assert!(matches!(err, Error::Schema { .. }));
        assert!(err.to_string().contains("SPEAKING_START"));
    }

    #[test]
    fn test_parse_layout_mode_update() {
        let parsed =
            parse_event_payload(EventName::ActivityLayoutModeUpdate, &json!({"layout_mode": 2}))
                .expect("parse");
        let EventData::ActivityLayoutModeUpdate(update) = parsed else {
            panic!("expected layout mode variant");
        };
        assert_eq!(update.layout_mode, LayoutMode::Grid);
    }

    #[test]
    fn test_parse_orientation_update() {
        let parsed = parse_event_payload(
            EventName::OrientationUpdate,
            &json!({"screen_orientation": 1, "orientation": "landscape"}),
        )
        .expect("parse");
        let EventData::OrientationUpdate(update) = parsed else {
            panic!("expected orientation variant");
        };
        assert_eq!(update.screen_orientation, OrientationState::Landscape);
        assert_eq!(update.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_voice_connection_state_coercion() {
        let parsed = parse_event_payload(
            EventName::VoiceConnectionStatus,
            &json!({
                "state": "QUANTUM_TUNNELING",
                "hostname": "voice.example.com",
                "pings": [12.0, 15.5],
                "average_ping": 13.75,
                "last_ping": 15.5,
            }),
        )
        .expect("parse");
        let EventData::VoiceConnectionStatus(status) = parsed else {
            panic!("expected connection status variant");
        };
        assert_eq!(status.state, VoiceConnectionState::Unhandled);
    }
}
