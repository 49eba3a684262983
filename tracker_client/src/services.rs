use std::sync::Arc;

use tokio::runtime::Handle;

use crate::api::TrackerApi;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// The user an overlay instance is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub username: String,
    pub avatar_url: String,
}

/// Resolves display identities and image URLs for users and guilds.
pub trait IdentityResolver: Send + Sync {
    fn resolve_user(&self, user_id: &str, name_hint: Option<&str>) -> Subject;

    fn user_avatar_url(&self, user_id: &str, avatar: Option<&str>) -> String;

    fn default_avatar_url(&self, user_id: &str) -> String;

    fn guild_icon_url(&self, guild_id: &str, icon: Option<&str>) -> Option<String>;
}

/// Selects (joins) a voice channel. Fire-and-forget: nothing is reported back.
pub trait VoiceChannelSelector: Send + Sync {
    fn select_voice_channel(&self, channel_id: &str);
}

/// Collaborators handed to every overlay instance, plus the runtime its
/// fetches are spawned on.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn TrackerApi>,
    pub identity: Arc<dyn IdentityResolver>,
    pub voice: Arc<dyn VoiceChannelSelector>,
    pub runtime: Handle,
}

impl Services {
    pub fn new(
        api: Arc<dyn TrackerApi>,
        identity: Arc<dyn IdentityResolver>,
        voice: Arc<dyn VoiceChannelSelector>,
        runtime: Handle,
    ) -> Self {
        Self {
            api,
            identity,
            voice,
            runtime,
        }
    }
}

/// Image URLs following the Discord CDN layout.
#[derive(Debug, Clone, Default)]
pub struct CdnIdentityResolver;

impl IdentityResolver for CdnIdentityResolver {
    fn resolve_user(&self, user_id: &str, name_hint: Option<&str>) -> Subject {
        Subject {
            id: user_id.to_string(),
            username: name_hint
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(user_id)
                .to_string(),
            avatar_url: self.default_avatar_url(user_id),
        }
    }

    fn user_avatar_url(&self, user_id: &str, avatar: Option<&str>) -> String {
        match avatar.filter(|hash| !hash.is_empty()) {
            Some(hash) => format!("{CDN_BASE}/avatars/{user_id}/{hash}.png"),
            None => self.default_avatar_url(user_id),
        }
    }

    fn default_avatar_url(&self, user_id: &str) -> String {
        let index = user_id
            .parse::<u64>()
            .map(|id| (id >> 22) % 6)
            .unwrap_or(0);
        format!("{CDN_BASE}/embed/avatars/{index}.png")
    }

    fn guild_icon_url(&self, guild_id: &str, icon: Option<&str>) -> Option<String> {
        icon.filter(|hash| !hash.is_empty())
            .map(|hash| format!("{CDN_BASE}/icons/{guild_id}/{hash}.png"))
    }
}
