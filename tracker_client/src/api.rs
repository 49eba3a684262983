use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::ApiError;
use crate::models::{CommentPage, GuildListResponse, GuildMembership, ProfileSnapshot};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Read-only access to the tracker service.
///
/// `Ok(None)` means the subject could not be fetched (any non-success status
/// or a failed round trip). `Err` is reserved for responses that arrived but
/// could not be decoded.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>, ApiError>;

    async fn fetch_guilds(&self, user_id: &str)
        -> Result<Option<Vec<GuildMembership>>, ApiError>;

    /// `page: None` requests the first page.
    async fn fetch_comments(
        &self,
        user_id: &str,
        page: Option<u32>,
    ) -> Result<Option<CommentPage>, ApiError>;
}

#[derive(Clone)]
pub struct TrackerClient {
    api_base_url: String,
    relay_url: String,
    client: Client,
}

impl TrackerClient {
    pub fn new(config: &TrackerConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(ApiError::ClientBuild)?;
        Ok(Self {
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            relay_url: config.relay_url.clone(),
            client,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    pub fn profile_url(&self, user_id: &str) -> String {
        format!(
            "{}/tracker/get-victim-info/{}/",
            self.api_base_url,
            encode_component(user_id)
        )
    }

    pub fn guilds_url(&self, user_id: &str) -> String {
        format!(
            "{}/tracker/get-mutual-guilds/{}/",
            self.api_base_url,
            encode_component(user_id)
        )
    }

    pub fn comments_url(&self, user_id: &str, page: Option<u32>) -> String {
        let mut url = format!(
            "{}/tracker/get-comments/{}/",
            self.api_base_url,
            encode_component(user_id)
        );
        if let Some(page) = page {
            url.push_str(&format!("?page={page}"));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, target: String) -> Result<Option<T>, ApiError> {
        let url = relay_request_url(&self.relay_url, &target)?;
        debug!(%target, "requesting through relay");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%target, error = %err, "tracker request failed");
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%target, %status, "tracker returned error status");
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(%target, error = %err, "failed to read tracker response body");
                return Ok(None);
            }
        };

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| ApiError::MalformedBody { url: target, source })
    }
}

#[async_trait]
impl TrackerApi for TrackerClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>, ApiError> {
        self.get_json(self.profile_url(user_id)).await
    }

    async fn fetch_guilds(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<GuildMembership>>, ApiError> {
        let wrapper: Option<GuildListResponse> = self.get_json(self.guilds_url(user_id)).await?;
        Ok(wrapper.map(|wrapper| wrapper.guild_list))
    }

    async fn fetch_comments(
        &self,
        user_id: &str,
        page: Option<u32>,
    ) -> Result<Option<CommentPage>, ApiError> {
        self.get_json(self.comments_url(user_id, page)).await
    }
}

/// Rewrites `target` through the relay: the whole target URL is
/// percent-encoded and appended to `relay`.
pub fn relay_request_url(relay: &str, target: &str) -> Result<Url, ApiError> {
    let raw = format!("{relay}{}", encode_component(target));
    Url::parse(&raw).map_err(|err| ApiError::InvalidUrl {
        url: raw.clone(),
        reason: err.to_string(),
    })
}

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> TrackerClient {
        TrackerClient::new(&TrackerConfig::default()).expect("client")
    }

    #[test]
    fn relay_wraps_encoded_target() {
        let url = relay_request_url(
            "https://corsproxy.io/?",
            "https://discord-tracker.com/tracker/get-comments/42/?page=2",
        )
        .expect("relay url");
        assert_eq!(
            url.as_str(),
            "https://corsproxy.io/?https%3A%2F%2Fdiscord-tracker.com%2Ftracker%2Fget-comments%2F42%2F%3Fpage%3D2"
        );
    }

    #[test]
    fn component_encoding_keeps_unreserved_marks() {
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_component("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn invalid_relay_is_rejected() {
        let err = relay_request_url("not a url ", "https://example.com/").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn endpoint_paths() {
        let client = client();
        assert_eq!(
            client.profile_url("7"),
            "https://discord-tracker.com/tracker/get-victim-info/7/"
        );
        assert_eq!(
            client.guilds_url("7"),
            "https://discord-tracker.com/tracker/get-mutual-guilds/7/"
        );
        assert_eq!(
            client.comments_url("7", None),
            "https://discord-tracker.com/tracker/get-comments/7/"
        );
        assert_eq!(
            client.comments_url("7", Some(3)),
            "https://discord-tracker.com/tracker/get-comments/7/?page=3"
        );
    }

    #[test]
    fn user_ids_cannot_escape_their_path_segment() {
        assert_eq!(
            client().profile_url("../admin"),
            "https://discord-tracker.com/tracker/get-victim-info/..%2Fadmin/"
        );
    }
}
