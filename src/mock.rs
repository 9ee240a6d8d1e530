//! Transport-free stand-in client for app development.
//!
//! [`MockClient`] exposes the same command and subscription surface as
//! [`EmbeddedClient`](crate::client::EmbeddedClient) but never touches a
//! message port: every command resolves immediately with a fixed, canned
//! payload, subscriptions are local-only, and tests drive events by hand
//! through [`MockClient::emit_event`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::commands::{ActivityInput, AuthorizeArgs, OrientationLockArgs, UserVoiceSettingsArgs};
use crate::compat::LayoutModeListener;
use crate::config::{Platform, SdkConfig};
use crate::error::Result;
use crate::identifiers::ListenerId;
use crate::protocol::CloseCode;
use crate::schema::common::{
    Activity, Entitlement, Pan, VoiceDevice, VoiceModeType, VoiceSettings, VoiceSettingsIo,
    VoiceSettingsMode,
};
use crate::schema::events::{ReadyConfig, ReadyData};
use crate::schema::responses::{
    AuthenticateData, AuthenticatedApplication, AuthenticatedUser, AuthorizeData, ChannelDetail,
    ChannelPermissionsData, GetSkusData, HardwareAccelerationData, ImageUploadData, LocaleData,
    PlatformBehaviorsData, SetConfigData, UserVoiceSettingsData,
};
use crate::schema::{EventData, EventName};
use crate::subscription::{EventListener, SubscriptionRegistry};

// ============================================================================
// MockClient
// ============================================================================

/// Development stand-in with the production command surface.
///
/// Events never arrive on their own; emit them from the test:
///
/// ```ignore
/// let mock = MockClient::new("client-1", "guild-1", "channel-1");
/// mock.emit_ready();
/// ```
#[derive(Clone)]
pub struct MockClient {
    client_id: String,
    guild_id: String,
    channel_id: String,
    platform: Platform,
    instance_id: String,
    frame_id: String,
    config: SdkConfig,
    registry: Arc<SubscriptionRegistry>,
}

impl MockClient {
    /// Creates a mock bound to fixed desktop session identifiers.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            platform: Platform::Desktop,
            instance_id: "123456789012345678".to_string(),
            frame_id: "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".to_string(),
            config: SdkConfig::default(),
            registry: Arc::new(SubscriptionRegistry::new()),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Resolves immediately; the mock is always ready.
    pub async fn ready(&self) -> Result<()> {
        Ok(())
    }

    /// Logs the close and does nothing else.
    pub fn close(&self, code: CloseCode, message: &str) {
        debug!(code = u16::from(code), message, "mock close");
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Registers a listener; nothing crosses any wire.
    pub async fn subscribe(&self, evt: EventName, listener: EventListener) -> Result<ListenerId> {
        Ok(self.registry.add(evt, listener).id)
    }

    /// Removes a listener; unknown ids are a no-op.
    pub async fn unsubscribe(&self, evt: EventName, id: ListenerId) -> Result<()> {
        self.registry.remove(evt, id);
        Ok(())
    }

    /// Registers a layout-mode listener on the modern event only.
    pub async fn subscribe_to_layout_mode_updates_compat(
        &self,
        listener: LayoutModeListener,
    ) -> Result<ListenerId> {
        let forward: EventListener = Arc::new(move |event| {
            if let EventData::ActivityLayoutModeUpdate(update) = event {
                listener(update);
            }
        });
        self.subscribe(EventName::ActivityLayoutModeUpdate, forward)
            .await
    }

    /// Removes a compat layout-mode listener.
    pub async fn unsubscribe_from_layout_mode_updates_compat(&self, id: ListenerId) -> Result<()> {
        self.unsubscribe(EventName::ActivityLayoutModeUpdate, id)
            .await
    }

    /// Delivers an event to local listeners. Returns listeners notified.
    pub fn emit_event(&self, event: &EventData) -> usize {
        self.registry.dispatch(event)
    }

    /// Emits a canned READY.
    pub fn emit_ready(&self) -> usize {
        self.emit_event(&EventData::Ready(ReadyData {
            v: 1,
            config: ReadyConfig {
                cdn_host: None,
                api_endpoint: "//127.0.0.1".to_string(),
                environment: "mock".to_string(),
            },
            user: None,
        }))
    }
}

// ============================================================================
// Canned Commands
// ============================================================================

impl MockClient {
    pub async fn authorize(&self, args: &AuthorizeArgs) -> Result<AuthorizeData> {
        debug!(client_id = %args.client_id, "mock authorize");
        Ok(AuthorizeData {
            code: "mock_code".to_string(),
        })
    }

    pub async fn authenticate(&self, _access_token: &str) -> Result<AuthenticateData> {
        debug!("mock authenticate");
        Ok(AuthenticateData {
            access_token: "mock_token".to_string(),
            user: AuthenticatedUser {
                username: "mock_user_username".to_string(),
                discriminator: "mock_user_discriminator".to_string(),
                id: "mock_user_id".to_string(),
                avatar: None,
                public_flags: 1,
            },
            scopes: Vec::new(),
            expires: "2121-02-01T00:00:00Z".to_string(),
            application: AuthenticatedApplication {
                description: "mock_app_description".to_string(),
                icon: Some("mock_app_icon".to_string()),
                id: "mock_app_id".to_string(),
                rpc_origins: None,
                name: "mock_app_name".to_string(),
            },
        })
    }

    pub async fn capture_log(&self, level: crate::client::ConsoleLevel, message: &str) -> Result<()> {
        debug!(?level, message, "mock capture_log");
        Ok(())
    }

    pub async fn encourage_hardware_acceleration(&self) -> Result<HardwareAccelerationData> {
        debug!("mock encourage_hardware_acceleration");
        Ok(HardwareAccelerationData { enabled: true })
    }

    pub async fn get_channel_permissions(&self) -> Result<ChannelPermissionsData> {
        debug!("mock get_channel_permissions");
        Ok(ChannelPermissionsData {
            permissions: json!("1234567890"),
        })
    }

    pub async fn get_entitlements(&self) -> Result<Vec<Entitlement>> {
        debug!("mock get_entitlements");
        Ok(Vec::new())
    }

    pub async fn get_platform_behaviors(&self) -> Result<PlatformBehaviorsData> {
        debug!("mock get_platform_behaviors");
        Ok(PlatformBehaviorsData {
            ios_keyboard_resizes_view: Some(true),
        })
    }

    pub async fn get_selected_voice_channel(&self) -> Result<Option<ChannelDetail>> {
        debug!("mock get_selected_voice_channel");
        Ok(None)
    }

    pub async fn get_skus(&self) -> Result<GetSkusData> {
        debug!("mock get_skus");
        Ok(GetSkusData { skus: Vec::new() })
    }

    pub async fn get_voice_settings(&self) -> Result<VoiceSettings> {
        debug!("mock get_voice_settings");
        let default_io = || VoiceSettingsIo {
            device_id: "default".to_string(),
            volume: 0.0,
            available_devices: vec![VoiceDevice {
                id: "default".to_string(),
                name: "default".to_string(),
            }],
        };
        Ok(VoiceSettings {
            input: default_io(),
            output: default_io(),
            mode: VoiceSettingsMode {
                mode_type: VoiceModeType::VoiceActivity,
                auto_threshold: false,
                threshold: 0.0,
                shortcut: Vec::new(),
                delay: 0.0,
            },
            automatic_gain_control: false,
            echo_cancellation: false,
            noise_suppression: false,
            qos: false,
            silence_warning: false,
            deaf: false,
            mute: false,
        })
    }

    pub async fn initiate_image_upload(&self) -> Result<Option<ImageUploadData>> {
        debug!("mock initiate_image_upload");
        Ok(Some(ImageUploadData {
            image_url: "https://cdn.example.com/uploads/mock-image.png".to_string(),
        }))
    }

    pub async fn open_external_link(&self, url: &str) -> Result<()> {
        debug!(url, "mock open_external_link");
        Ok(())
    }

    pub async fn open_invite_dialog(&self) -> Result<()> {
        debug!("mock open_invite_dialog");
        Ok(())
    }

    pub async fn open_share_moment_dialog(&self, media_url: &str) -> Result<()> {
        debug!(media_url, "mock open_share_moment_dialog");
        Ok(())
    }

    pub async fn set_activity(&self, _activity: &ActivityInput) -> Result<Activity> {
        debug!("mock set_activity");
        Ok(Activity {
            name: "mock_activity_name".to_string(),
            activity_type: 0,
            url: None,
            created_at: None,
            timestamps: None,
            application_id: None,
            details: None,
            state: None,
            emoji: None,
            party: None,
            assets: None,
            secrets: None,
            instance: None,
            flags: None,
        })
    }

    pub async fn set_config(&self, use_interactive_pip: bool) -> Result<SetConfigData> {
        debug!(use_interactive_pip, "mock set_config");
        Ok(SetConfigData {
            use_interactive_pip: false,
        })
    }

    pub async fn set_orientation_lock_state(&self, _args: &OrientationLockArgs) -> Result<()> {
        debug!("mock set_orientation_lock_state");
        Ok(())
    }

    pub async fn set_user_voice_settings(
        &self,
        args: &UserVoiceSettingsArgs,
    ) -> Result<UserVoiceSettingsData> {
        debug!(user_id = %args.user_id, "mock set_user_voice_settings");
        Ok(UserVoiceSettingsData {
            user_id: "user_id".to_string(),
            pan: Some(Pan {
                left: 1.0,
                right: 1.0,
            }),
            volume: Some(100.0),
            mute: Some(false),
        })
    }

    pub async fn start_premium_purchase(&self) -> Result<()> {
        debug!("mock start_premium_purchase");
        Ok(())
    }

    pub async fn start_purchase(&self, sku_id: &str) -> Result<Option<Vec<Entitlement>>> {
        debug!(sku_id, "mock start_purchase");
        Ok(Some(Vec::new()))
    }

    pub async fn user_settings_get_locale(&self) -> Result<LocaleData> {
        debug!("mock user_settings_get_locale");
        Ok(LocaleData {
            locale: String::new(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
