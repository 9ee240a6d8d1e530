//! Typed command surface.
//!
//! One async method per remote operation. Each method serializes its args,
//! sends a FRAME through the client core, awaits the correlated response,
//! and narrows the validated payload to the command's declared shape. A
//! response that validates against a different command's shape is a
//! non-recoverable [`Error::UnexpectedResponse`].
//!
//! `set_orientation_lock_state` is the one command with a legacy fallback:
//! when the host rejects its args with the invalid-payload code, the args
//! are re-derived in the legacy shape and sent exactly once more.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Value, json};

use crate::client::EmbeddedClient;
use crate::error::{Error, Result};
use crate::protocol::OutgoingFrame;
use crate::schema::common::{
    Activity, ActivityAssets, ActivityParty, ActivitySecrets, ActivityTimestamps, Command,
    Entitlement, OrientationLockState, Pan, Scope, VoiceSettings,
};
use crate::schema::responses::{
    AuthenticateData, AuthorizeData, ChannelDetail, ChannelPermissionsData, GetEntitlementsData,
    GetSkusData, HardwareAccelerationData, ImageUploadData, LocaleData, PlatformBehaviorsData,
    ResponseData, SetConfigData, UserVoiceSettingsData,
};

// ============================================================================
// Argument Shapes
// ============================================================================

/// Args for [`EmbeddedClient::authorize`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeArgs {
    pub client_id: String,
    pub response_type: String,
    pub state: String,
    pub prompt: String,
    pub scope: Vec<Scope>,
}

/// Activity fields an app may set; everything else is host-derived.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityInput {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<ActivityTimestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<ActivityAssets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<ActivityParty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ActivitySecrets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<bool>,
}

/// Args for [`EmbeddedClient::set_user_voice_settings`].
#[derive(Debug, Clone, Serialize)]
pub struct UserVoiceSettingsArgs {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<Pan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
}

/// Args for [`EmbeddedClient::set_orientation_lock_state`].
#[derive(Debug, Clone, Serialize)]
pub struct OrientationLockArgs {
    pub lock_state: OrientationLockState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_in_picture_lock_state: Option<OrientationLockState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_lock_state: Option<OrientationLockState>,
}

impl OrientationLockArgs {
    /// Legacy arg shape: hosts that predate the grid lock reject the modern
    /// shape with invalid-payload.
    fn legacy(&self) -> Value {
        json!({
            "lock_state": self.lock_state,
            "picture_in_picture_lock_state": self.picture_in_picture_lock_state,
        })
    }
}

// ============================================================================
// Send Helpers
// ============================================================================

impl EmbeddedClient {
    async fn send(&self, cmd: Command, args: Value) -> Result<ResponseData> {
        let frame = OutgoingFrame::new(cmd, args);
        Ok(self.inner.send_command(frame).await?.data)
    }

    /// Sends once, retrying exactly once with legacy args on invalid-payload.
    async fn send_with_fallback(
        &self,
        cmd: Command,
        args: Value,
        legacy_args: Value,
    ) -> Result<ResponseData> {
        match self.send(cmd, args).await {
            Err(e) if e.is_invalid_payload() => self.send(cmd, legacy_args).await,
            other => other,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

impl EmbeddedClient {
    /// Begins the OAuth authorization flow, yielding a grant code.
    pub async fn authorize(&self, args: &AuthorizeArgs) -> Result<AuthorizeData> {
        match self.send(Command::Authorize, serde_json::to_value(args)?).await? {
            ResponseData::Authorize(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::Authorize.as_str())),
        }
    }

    /// Exchanges an access token for the authenticated session description.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticateData> {
        let args = json!({"access_token": access_token});
        match self.send(Command::Authenticate, args).await? {
            ResponseData::Authenticate(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::Authenticate.as_str())),
        }
    }

    /// Ships one log line to the host.
    pub async fn capture_log(
        &self,
        level: crate::client::ConsoleLevel,
        message: &str,
    ) -> Result<()> {
        let args = json!({"level": level, "message": message});
        match self.send(Command::CaptureLog, args).await? {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(Command::CaptureLog.as_str())),
        }
    }

    /// Asks the host to suggest enabling hardware acceleration.
    pub async fn encourage_hardware_acceleration(&self) -> Result<HardwareAccelerationData> {
        match self.send(Command::EncourageHwAcceleration, json!({})).await? {
            ResponseData::EncourageHardwareAcceleration(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::EncourageHwAcceleration.as_str(),
            )),
        }
    }

    /// Fetches the caller's permission bits in the current channel.
    pub async fn get_channel_permissions(&self) -> Result<ChannelPermissionsData> {
        match self.send(Command::GetChannelPermissions, json!({})).await? {
            ResponseData::GetChannelPermissions(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::GetChannelPermissions.as_str(),
            )),
        }
    }

    /// Lists entitlements owned by the current user.
    pub async fn get_entitlements(&self) -> Result<Vec<Entitlement>> {
        match self.send(Command::GetEntitlementsEmbedded, json!({})).await? {
            ResponseData::GetEntitlements(GetEntitlementsData { entitlements }) => Ok(entitlements),
            _ => Err(Error::unexpected_response(
                Command::GetEntitlementsEmbedded.as_str(),
            )),
        }
    }

    /// Fetches platform behavior hints.
    pub async fn get_platform_behaviors(&self) -> Result<PlatformBehaviorsData> {
        match self.send(Command::GetPlatformBehaviors, json!({})).await? {
            ResponseData::GetPlatformBehaviors(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::GetPlatformBehaviors.as_str(),
            )),
        }
    }

    /// Fetches the voice channel the user currently occupies, if any.
    pub async fn get_selected_voice_channel(&self) -> Result<Option<ChannelDetail>> {
        match self.send(Command::GetSelectedVoiceChannel, json!({})).await? {
            ResponseData::GetSelectedVoiceChannel(channel) => Ok(channel),
            _ => Err(Error::unexpected_response(
                Command::GetSelectedVoiceChannel.as_str(),
            )),
        }
    }

    /// Lists purchasable SKUs for this application.
    pub async fn get_skus(&self) -> Result<GetSkusData> {
        match self.send(Command::GetSkusEmbedded, json!({})).await? {
            ResponseData::GetSkus(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::GetSkusEmbedded.as_str())),
        }
    }

    /// Fetches the user's full voice settings.
    pub async fn get_voice_settings(&self) -> Result<VoiceSettings> {
        match self.send(Command::GetVoiceSettings, json!({})).await? {
            ResponseData::VoiceSettings(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::GetVoiceSettings.as_str())),
        }
    }

    /// Opens the host's image-upload flow; `None` when the user cancels.
    pub async fn initiate_image_upload(&self) -> Result<Option<ImageUploadData>> {
        match self.send(Command::InitiateImageUpload, json!({})).await? {
            ResponseData::InitiateImageUpload(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::InitiateImageUpload.as_str(),
            )),
        }
    }

    /// Opens a URL in the host's external browser.
    pub async fn open_external_link(&self, url: &str) -> Result<()> {
        match self.send(Command::OpenExternalLink, json!({"url": url})).await? {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(Command::OpenExternalLink.as_str())),
        }
    }

    /// Opens the host's invite dialog for the current activity.
    pub async fn open_invite_dialog(&self) -> Result<()> {
        match self.send(Command::OpenInviteDialog, json!({})).await? {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(Command::OpenInviteDialog.as_str())),
        }
    }

    /// Opens the host's share-moment dialog for a piece of media.
    pub async fn open_share_moment_dialog(&self, media_url: &str) -> Result<()> {
        let args = json!({"mediaUrl": media_url});
        match self.send(Command::OpenShareMomentDialog, args).await? {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(
                Command::OpenShareMomentDialog.as_str(),
            )),
        }
    }

    /// Publishes the user's rich-presence activity.
    pub async fn set_activity(&self, activity: &ActivityInput) -> Result<Activity> {
        let args = json!({"activity": activity});
        match self.send(Command::SetActivity, args).await? {
            ResponseData::SetActivity(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::SetActivity.as_str())),
        }
    }

    /// Toggles interactive picture-in-picture.
    pub async fn set_config(&self, use_interactive_pip: bool) -> Result<SetConfigData> {
        let args = json!({"use_interactive_pip": use_interactive_pip});
        match self.send(Command::SetConfig, args).await? {
            ResponseData::SetConfig(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::SetConfig.as_str())),
        }
    }

    /// Locks the activity's screen orientation.
    ///
    /// Falls back to the legacy arg shape (no grid lock) exactly once when
    /// the host rejects the modern shape with invalid-payload.
    pub async fn set_orientation_lock_state(&self, args: &OrientationLockArgs) -> Result<()> {
        let modern = serde_json::to_value(args)?;
        match self
            .send_with_fallback(Command::SetOrientationLockState, modern, args.legacy())
            .await?
        {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(
                Command::SetOrientationLockState.as_str(),
            )),
        }
    }

    /// Adjusts another participant's local volume, pan, or mute.
    pub async fn set_user_voice_settings(
        &self,
        args: &UserVoiceSettingsArgs,
    ) -> Result<UserVoiceSettingsData> {
        match self
            .send(Command::SetUserVoiceSettings, serde_json::to_value(args)?)
            .await?
        {
            ResponseData::SetUserVoiceSettings(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::SetUserVoiceSettings.as_str(),
            )),
        }
    }

    /// Opens the premium purchase flow.
    pub async fn start_premium_purchase(&self) -> Result<()> {
        match self.send(Command::StartPremiumPurchase, json!({})).await? {
            ResponseData::Empty => Ok(()),
            _ => Err(Error::unexpected_response(
                Command::StartPremiumPurchase.as_str(),
            )),
        }
    }

    /// Opens the purchase flow for one SKU; resolves with any entitlements
    /// granted.
    pub async fn start_purchase(&self, sku_id: &str) -> Result<Option<Vec<Entitlement>>> {
        let args = json!({"sku_id": sku_id});
        match self.send(Command::StartPurchase, args).await? {
            ResponseData::StartPurchase(data) => Ok(data),
            _ => Err(Error::unexpected_response(Command::StartPurchase.as_str())),
        }
    }

    /// Fetches the user's locale.
    pub async fn user_settings_get_locale(&self) -> Result<LocaleData> {
        match self.send(Command::UserSettingsGetLocale, json!({})).await? {
            ResponseData::UserSettingsGetLocale(data) => Ok(data),
            _ => Err(Error::unexpected_response(
                Command::UserSettingsGetLocale.as_str(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
