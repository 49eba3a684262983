use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracker_client::models::{CommentPage, GuildMembership, ProfileSnapshot};
use tracker_client::{ApiError, CdnIdentityResolver, Services, TrackerApi};

use crate::host::TerminalVoice;

/// Serves the same fixtures for every user.
#[derive(Default)]
pub struct StaticApi {
    pub profile: Option<ProfileSnapshot>,
    pub guilds: Option<Vec<GuildMembership>>,
    pub comments: Option<CommentPage>,
    calls: AtomicUsize,
}

impl StaticApi {
    pub fn from_json(
        profile: serde_json::Value,
        guilds: serde_json::Value,
        comments: serde_json::Value,
    ) -> Self {
        Self {
            profile: serde_json::from_value(profile).expect("profile fixture"),
            guilds: serde_json::from_value(guilds).expect("guilds fixture"),
            comments: serde_json::from_value(comments).expect("comments fixture"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackerApi for StaticApi {
    async fn fetch_profile(&self, _user_id: &str) -> Result<Option<ProfileSnapshot>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profile.clone())
    }

    async fn fetch_guilds(
        &self,
        _user_id: &str,
    ) -> Result<Option<Vec<GuildMembership>>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.guilds.clone())
    }

    async fn fetch_comments(
        &self,
        _user_id: &str,
        _page: Option<u32>,
    ) -> Result<Option<CommentPage>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.comments.clone())
    }
}

pub fn services(api: Arc<StaticApi>) -> Services {
    Services::new(
        api,
        Arc::new(CdnIdentityResolver),
        Arc::new(TerminalVoice),
        tokio::runtime::Handle::current(),
    )
}
