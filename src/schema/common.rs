//! Shared payload shapes.
//!
//! Shapes referenced from more than one command or event live here, together
//! with the enumerations the host is allowed to extend.
//!
//! # Open enumerations
//!
//! The host ships new enum members without a protocol version bump, so open
//! enumerations never fail validation on an unknown value: they coerce it to
//! an explicit [`Unhandled`](OpenEnum) sentinel (wire value `-1`) instead.
//! Closed enumerations (e.g. [`Command`]) reject unknown values.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Open Enum Macros
// ============================================================================

/// Declares a string-valued open enumeration.
///
/// Unknown wire strings coerce to `Unhandled`, which serializes as `-1`.
macro_rules! open_string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "Value", into = "Value")]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
            /// Wire value outside the known set.
            Unhandled,
        }

        impl From<Value> for $name {
            fn from(value: Value) -> Self {
                match value.as_str() {
                    $(Some($wire) => Self::$variant,)+
                    _ => Self::Unhandled,
                }
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Value::from($wire),)+
                    $name::Unhandled => Value::from(-1),
                }
            }
        }
    };
}

/// Declares an integer-valued open enumeration.
///
/// Unknown wire integers coerce to `Unhandled`, which serializes as `-1`.
macro_rules! open_int_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "Value", into = "Value")]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
            /// Wire value outside the known set.
            Unhandled,
        }

        impl From<Value> for $name {
            fn from(value: Value) -> Self {
                match value.as_i64() {
                    $(Some($wire) => Self::$variant,)+
                    _ => Self::Unhandled,
                }
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Value::from($wire),)+
                    $name::Unhandled => Value::from(-1),
                }
            }
        }
    };
}

pub(crate) use {open_int_enum, open_string_enum};

// ============================================================================
// Command
// ============================================================================

/// Pushed-event marker carried in the `cmd` slot of event frames.
pub const DISPATCH: &str = "DISPATCH";

/// Remote command names (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Authorize,
    Authenticate,
    GetGuilds,
    GetGuild,
    GetChannel,
    GetChannels,
    SetUserVoiceSettings,
    SelectVoiceChannel,
    GetSelectedVoiceChannel,
    SelectTextChannel,
    GetVoiceSettings,
    SetVoiceSettings,
    Subscribe,
    Unsubscribe,
    CaptureShortcut,
    SetCertifiedDevices,
    SetActivity,
    GetSkus,
    GetEntitlements,
    GetSkusEmbedded,
    GetEntitlementsEmbedded,
    StartPurchase,
    StartPremiumPurchase,
    SetConfig,
    SendAnalyticsEvent,
    UserSettingsGetLocale,
    OpenExternalLink,
    EncourageHwAcceleration,
    CaptureLog,
    SetOrientationLockState,
    OpenInviteDialog,
    GetPlatformBehaviors,
    GetChannelPermissions,
    OpenShareMomentDialog,
    InitiateImageUpload,
}

impl Command {
    /// Parses a wire command name.
    ///
    /// Returns `None` for names outside the closed set; the dispatcher
    /// treats that as a protocol contract violation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::from(name)).ok()
    }

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorize => "AUTHORIZE",
            Self::Authenticate => "AUTHENTICATE",
            Self::GetGuilds => "GET_GUILDS",
            Self::GetGuild => "GET_GUILD",
            Self::GetChannel => "GET_CHANNEL",
            Self::GetChannels => "GET_CHANNELS",
            Self::SetUserVoiceSettings => "SET_USER_VOICE_SETTINGS",
            Self::SelectVoiceChannel => "SELECT_VOICE_CHANNEL",
            Self::GetSelectedVoiceChannel => "GET_SELECTED_VOICE_CHANNEL",
            Self::SelectTextChannel => "SELECT_TEXT_CHANNEL",
            Self::GetVoiceSettings => "GET_VOICE_SETTINGS",
            Self::SetVoiceSettings => "SET_VOICE_SETTINGS",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::CaptureShortcut => "CAPTURE_SHORTCUT",
            Self::SetCertifiedDevices => "SET_CERTIFIED_DEVICES",
            Self::SetActivity => "SET_ACTIVITY",
            Self::GetSkus => "GET_SKUS",
            Self::GetEntitlements => "GET_ENTITLEMENTS",
            Self::GetSkusEmbedded => "GET_SKUS_EMBEDDED",
            Self::GetEntitlementsEmbedded => "GET_ENTITLEMENTS_EMBEDDED",
            Self::StartPurchase => "START_PURCHASE",
            Self::StartPremiumPurchase => "START_PREMIUM_PURCHASE",
            Self::SetConfig => "SET_CONFIG",
            Self::SendAnalyticsEvent => "SEND_ANALYTICS_EVENT",
            Self::UserSettingsGetLocale => "USER_SETTINGS_GET_LOCALE",
            Self::OpenExternalLink => "OPEN_EXTERNAL_LINK",
            Self::EncourageHwAcceleration => "ENCOURAGE_HW_ACCELERATION",
            Self::CaptureLog => "CAPTURE_LOG",
            Self::SetOrientationLockState => "SET_ORIENTATION_LOCK_STATE",
            Self::OpenInviteDialog => "OPEN_INVITE_DIALOG",
            Self::GetPlatformBehaviors => "GET_PLATFORM_BEHAVIORS",
            Self::GetChannelPermissions => "GET_CHANNEL_PERMISSIONS",
            Self::OpenShareMomentDialog => "OPEN_SHARE_MOMENT_DIALOG",
            Self::InitiateImageUpload => "INITIATE_IMAGE_UPLOAD",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Open Enumerations
// ============================================================================

open_string_enum! {
    /// OAuth scope.
    Scope {
        Bot => "bot",
        Rpc => "rpc",
        Identify => "identify",
        Connections => "connections",
        Email => "email",
        Guilds => "guilds",
        GuildsJoin => "guilds.join",
        GuildsMembersRead => "guilds.members.read",
        GdmJoin => "gdm.join",
        MessagesRead => "messages.read",
        RpcNotificationsRead => "rpc.notifications.read",
        RpcVoiceWrite => "rpc.voice.write",
        RpcVoiceRead => "rpc.voice.read",
        RpcActivitiesWrite => "rpc.activities.write",
        WebhookIncoming => "webhook.incoming",
        ApplicationsBuildsUpload => "applications.builds.upload",
        ApplicationsBuildsRead => "applications.builds.read",
        ApplicationsStoreUpdate => "applications.store.update",
        ApplicationsEntitlements => "applications.entitlements",
        RelationshipsRead => "relationships.read",
        ActivitiesRead => "activities.read",
        ActivitiesWrite => "activities.write",
    }
}

open_string_enum! {
    /// Presence status.
    Status {
        Idle => "idle",
        Dnd => "dnd",
        Online => "online",
        Offline => "offline",
    }
}

open_string_enum! {
    /// Voice input mode.
    VoiceModeType {
        PushToTalk => "PUSH_TO_TALK",
        VoiceActivity => "VOICE_ACTIVITY",
    }
}

open_string_enum! {
    /// Certified hardware device class.
    CertifiedDeviceType {
        AudioInput => "AUDIO_INPUT",
        AudioOutput => "AUDIO_OUTPUT",
        VideoInput => "VIDEO_INPUT",
    }
}

open_int_enum! {
    /// Permission overwrite target.
    PermissionOverwriteType {
        Role => 0,
        Member => 1,
    }
}

open_int_enum! {
    /// Channel type.
    ChannelType {
        GuildText => 0,
        Dm => 1,
        GuildVoice => 2,
        GroupDm => 3,
        GuildCategory => 4,
        GuildAnnouncement => 5,
        GuildStore => 6,
        AnnouncementThread => 10,
        PublicThread => 11,
        PrivateThread => 12,
        GuildStageVoice => 13,
        GuildDirectory => 14,
        GuildForum => 15,
    }
}

open_int_enum! {
    /// Shortcut key class.
    KeyType {
        KeyboardKey => 0,
        MouseButton => 1,
        KeyboardModifierKey => 2,
        GamepadButton => 3,
    }
}

open_int_enum! {
    /// SKU type.
    SkuType {
        Application => 1,
        Dlc => 2,
        Consumable => 3,
        Bundle => 4,
        Subscription => 5,
    }
}

open_int_enum! {
    /// Entitlement type.
    EntitlementType {
        Purchase => 1,
        PremiumSubscription => 2,
        DeveloperGift => 3,
        TestModePurchase => 4,
        FreePurchase => 5,
        UserGift => 6,
        PremiumPurchase => 7,
    }
}

open_int_enum! {
    /// Orientation lock state.
    OrientationLockState {
        Unlocked => 1,
        Portrait => 2,
        Landscape => 3,
    }
}

open_int_enum! {
    /// Device thermal state.
    ThermalState {
        Nominal => 0,
        Fair => 1,
        Serious => 2,
        Critical => 3,
    }
}

open_int_enum! {
    /// Screen orientation.
    OrientationState {
        Portrait => 0,
        Landscape => 1,
    }
}

open_int_enum! {
    /// Activity layout mode.
    LayoutMode {
        Focused => 0,
        Pip => 1,
        Grid => 2,
    }
}

/// Orientation keyword (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

// ============================================================================
// User & Member Shapes
// ============================================================================

/// A user on the host platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "publicFlags", default, skip_serializing_if = "Option::is_none")]
    pub public_flags: Option<i64>,
}

/// A user's membership in a guild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMember {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
    pub roles: Vec<String>,
    pub joined_at: String,
    pub deaf: bool,
    pub mute: bool,
}

/// Custom or unicode emoji.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoji {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_colons: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

// ============================================================================
// Voice Shapes
// ============================================================================

/// Mute/deafen flags for a voice participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceState {
    pub mute: bool,
    pub deaf: bool,
    pub self_mute: bool,
    pub self_deaf: bool,
    pub suppress: bool,
}

/// A participant in a voice channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserVoiceState {
    pub mute: bool,
    pub nick: String,
    pub user: User,
    pub voice_state: VoiceState,
    pub volume: f64,
}

/// Stereo pan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pan {
    pub left: f64,
    pub right: f64,
}

/// An audio device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceDevice {
    pub id: String,
    pub name: String,
}

/// A bound shortcut key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutKey {
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub code: i64,
    pub name: String,
}

/// Voice input mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettingsMode {
    #[serde(rename = "type")]
    pub mode_type: VoiceModeType,
    pub auto_threshold: bool,
    pub threshold: f64,
    pub shortcut: Vec<ShortcutKey>,
    pub delay: f64,
}

/// Input or output device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettingsIo {
    pub device_id: String,
    pub volume: f64,
    pub available_devices: Vec<VoiceDevice>,
}

/// Full local voice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub input: VoiceSettingsIo,
    pub output: VoiceSettingsIo,
    pub mode: VoiceSettingsMode,
    pub automatic_gain_control: bool,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub qos: bool,
    pub silence_warning: bool,
    pub deaf: bool,
    pub mute: bool,
}

/// Vendor/model descriptor for a certified device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceVendor {
    pub name: String,
    pub url: String,
}

/// A certified hardware device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertifiedDevice {
    #[serde(rename = "type")]
    pub device_type: CertifiedDeviceType,
    pub id: String,
    pub vendor: DeviceVendor,
    pub model: DeviceVendor,
    pub related: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo_cancellation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_suppression: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_gain_control: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_mute: Option<bool>,
}

// ============================================================================
// Activity Shapes
// ============================================================================

/// Activity start/end timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

/// Activity party.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<i64>>,
}

/// Activity art assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

/// Activity join/match secrets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySecrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<String>,
}

/// A rich-presence activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<ActivityTimestamps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<ActivityParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ActivityAssets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ActivitySecrets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<i64>,
}

// ============================================================================
// Channel & Guild Shapes
// ============================================================================

/// A permission overwrite on a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: String,
    #[serde(rename = "type")]
    pub overwrite_type: PermissionOverwriteType,
    pub allow: String,
    pub deny: String,
}

/// A channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_overwrites: Option<Vec<PermissionOverwrite>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_user: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pin_timestamp: Option<String>,
}

/// Per-client presence status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<Status>,
}

/// A presence update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub user: User,
    pub guild_id: String,
    pub status: Status,
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub client_status: ClientStatus,
}

/// A guild role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub color: i64,
    pub hoist: bool,
    pub position: i64,
    pub permissions: String,
    pub managed: bool,
    pub mentionable: bool,
}

/// A guild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_hash: Option<String>,
    pub splash: Option<String>,
    pub discovery_splash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
    pub region: String,
    pub afk_channel_id: Option<String>,
    pub afk_timeout: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_channel_id: Option<String>,
    pub verification_level: i64,
    pub default_message_notifications: i64,
    pub explicit_content_filter: i64,
    pub roles: Vec<Role>,
    pub emojis: Vec<Emoji>,
    pub features: Vec<String>,
    pub mfa_level: i64,
    pub application_id: Option<String>,
    pub system_channel_id: Option<String>,
    pub system_channel_flags: i64,
    pub rules_channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_states: Option<Vec<VoiceState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<GuildMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presences: Option<Vec<PresenceUpdate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_presences: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<i64>,
    pub vanity_url_code: Option<String>,
    pub description: Option<String>,
    pub banner: Option<String>,
    pub premium_tier: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_subscription_count: Option<i64>,
    pub preferred_locale: String,
    pub public_updates_channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_video_channel_users: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_member_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_presence_count: Option<i64>,
}

// ============================================================================
// Message Shapes
// ============================================================================

/// A channel referenced from message content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMention {
    pub id: String,
    pub guild_id: String,
    #[serde(rename = "type")]
    pub channel_type: i64,
    pub name: String,
}

/// A message attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub size: i64,
    pub url: String,
    pub proxy_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
}

/// Embed footer line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_icon_url: Option<String>,
}

/// Embed image or thumbnail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
}

/// Embed provider line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Embed author line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_icon_url: Option<String>,
}

/// Embed name/value field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A rich embed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub embed_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<EmbedProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<EmbedField>>,
}

/// A message reaction tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub count: i64,
    pub me: bool,
    pub emoji: Emoji,
}

/// Message activity attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageActivity {
    #[serde(rename = "type")]
    pub activity_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<String>,
}

/// Message application attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageApplication {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub name: String,
}

/// Cross-reference to another message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<GuildMember>,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<String>,
    pub tts: bool,
    pub mention_everyone: bool,
    pub mentions: Vec<User>,
    pub mention_roles: Vec<String>,
    pub mention_channels: Vec<ChannelMention>,
    pub attachments: Vec<Attachment>,
    pub embeds: Vec<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Value>,
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<MessageActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<MessageApplication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stickers: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_message: Option<Value>,
}

// ============================================================================
// Commerce Shapes
// ============================================================================

/// SKU price tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuPrice {
    pub amount: i64,
    pub currency: String,
}

/// A purchasable SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sku_type: SkuType,
    pub price: SkuPrice,
    pub application_id: String,
    pub flags: i64,
    pub release_date: Option<String>,
}

/// An owned entitlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    pub sku_id: String,
    pub application_id: String,
    pub user_id: String,
    pub gift_code_flags: i64,
    #[serde(rename = "type")]
    pub entitlement_type: EntitlementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gifter_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_code_batch_id: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_names() {
        assert_eq!(Command::SetOrientationLockState.as_str(), "SET_ORIENTATION_LOCK_STATE");
        assert_eq!(Command::EncourageHwAcceleration.as_str(), "ENCOURAGE_HW_ACCELERATION");
        assert_eq!(Command::parse("SUBSCRIBE"), Some(Command::Subscribe));
        assert_eq!(Command::parse("NOT_A_COMMAND"), None);
    }

    #[test]
    fn test_command_serde_round_trip() {
        for cmd in [
            Command::Authorize,
            Command::GetChannelPermissions,
            Command::InitiateImageUpload,
            Command::UserSettingsGetLocale,
        ] {
            let json = serde_json::to_value(cmd).expect("serialize");
            assert_eq!(json, json!(cmd.as_str()));
            assert_eq!(Command::parse(cmd.as_str()), Some(cmd));
        }
    }

    #[test]
    fn test_open_string_enum_coerces_unknown() {
        let status: Status = serde_json::from_value(json!("online")).expect("known");
        assert_eq!(status, Status::Online);

        let status: Status = serde_json::from_value(json!("hibernating")).expect("unknown");
        assert_eq!(status, Status::Unhandled);

        // Numbers coerce too rather than failing validation.
        let status: Status = serde_json::from_value(json!(7)).expect("number");
        assert_eq!(status, Status::Unhandled);
    }

    #[test]
    fn test_open_int_enum_coerces_unknown() {
        let ty: ChannelType = serde_json::from_value(json!(2)).expect("known");
        assert_eq!(ty, ChannelType::GuildVoice);

        let ty: ChannelType = serde_json::from_value(json!(99)).expect("unknown");
        assert_eq!(ty, ChannelType::Unhandled);

        let unhandled = serde_json::to_value(ChannelType::Unhandled).expect("serialize");
        assert_eq!(unhandled, json!(-1));
    }

    #[test]
    fn test_layout_mode_values() {
        assert_eq!(
            serde_json::from_value::<LayoutMode>(json!(1)).expect("pip"),
            LayoutMode::Pip
        );
        assert_eq!(
            serde_json::from_value::<LayoutMode>(json!(0)).expect("focused"),
            LayoutMode::Focused
        );
    }

    #[test]
    fn test_user_optional_fields() {
        let user: User = serde_json::from_value(json!({
            "id": "1",
            "username": "echo",
            "discriminator": "0001",
        }))
        .expect("deserialize");
        assert!(user.avatar.is_none());
        assert!(user.public_flags.is_none());
    }

    #[test]
    fn test_activity_round_trip_minimal() {
        let activity: Activity = serde_json::from_value(json!({
            "name": "Chess",
            "type": 0,
        }))
        .expect("deserialize");
        let value = serde_json::to_value(&activity).expect("serialize");
        assert_eq!(value["name"], json!("Chess"));
        // Absent optionals are omitted, not serialized as null.
        assert!(value.get("url").is_none());
    }

    #[test]
    fn test_scope_dotted_names() {
        let scope: Scope = serde_json::from_value(json!("guilds.members.read")).expect("scope");
        assert_eq!(scope, Scope::GuildsMembersRead);
        assert_eq!(serde_json::to_value(scope).expect("serialize"), json!("guilds.members.read"));
    }
}
