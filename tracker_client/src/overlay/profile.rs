use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::info;

use crate::models::{ProfileSnapshot, VoicePresence, VoiceSelfState};
use crate::services::{IdentityResolver, Subject, VoiceChannelSelector};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Display values derived once from a fetched profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub snapshot: ProfileSnapshot,
    pub display_name: String,
    pub avatar_url: String,
    pub hours_in_voice: u64,
    pub last_in_voice: String,
    pub tracked_since: Option<String>,
    pub voice: Option<VoiceView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceView {
    pub guild_id: String,
    pub guild_name: String,
    pub guild_icon_url: Option<String>,
    pub category_name: String,
    pub channel_id: String,
    pub channel_name: String,
    pub occupancy: usize,
    /// Zero means unlimited.
    pub user_limit: u32,
    pub can_connect: bool,
    pub self_state: VoiceSelfState,
}

impl VoiceView {
    fn from_presence(presence: &VoicePresence, identity: &dyn IdentityResolver) -> Self {
        Self {
            guild_id: presence.guild.id.clone(),
            guild_name: presence.guild.name.clone(),
            guild_icon_url: identity
                .guild_icon_url(&presence.guild.id, presence.guild.icon.as_deref()),
            category_name: presence.category.name.clone(),
            channel_id: presence.channel.id.clone(),
            channel_name: presence.channel.name.clone(),
            occupancy: presence.channel.members.len(),
            user_limit: presence.channel.user_limit,
            can_connect: presence.channel.permission_to_connect,
            self_state: presence.voice_state,
        }
    }

    pub fn occupancy_label(&self) -> String {
        if self.user_limit == 0 {
            format!("{}", self.occupancy)
        } else {
            format!("{}/{}", self.occupancy, self.user_limit)
        }
    }
}

impl ProfileView {
    pub fn from_snapshot(
        snapshot: ProfileSnapshot,
        subject: &Subject,
        identity: &dyn IdentityResolver,
    ) -> Self {
        let display_name = snapshot
            .actual_display_name
            .as_deref()
            .or(snapshot.actual_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&subject.username)
            .to_string();
        let avatar_url = match snapshot.actual_avatar.as_deref() {
            Some(avatar) if !avatar.is_empty() => {
                identity.user_avatar_url(&subject.id, Some(avatar))
            }
            _ => subject.avatar_url.clone(),
        };
        let voice = snapshot
            .in_voice
            .as_ref()
            .map(|presence| VoiceView::from_presence(presence, identity));

        Self {
            display_name,
            avatar_url,
            hours_in_voice: hours_in_voice(snapshot.time_in_voice),
            last_in_voice: format_timestamp(snapshot.last_date_in_voice.as_deref()),
            tracked_since: snapshot.date.as_deref().map(|raw| format_timestamp(Some(raw))),
            voice,
            snapshot,
        }
    }

    /// Asks the voice collaborator to join the channel the subject is in.
    /// Returns `false` without calling it when there is no voice presence.
    pub fn join_voice(&self, selector: &dyn VoiceChannelSelector) -> bool {
        match &self.voice {
            Some(voice) => {
                info!(channel_id = %voice.channel_id, "selecting voice channel");
                selector.select_voice_channel(&voice.channel_id);
                true
            }
            None => false,
        }
    }
}

/// Whole hours; absent, zero, negative or non-finite inputs yield 0.
pub fn hours_in_voice(seconds: Option<f64>) -> u64 {
    match seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
            (seconds / SECONDS_PER_HOUR).floor() as u64
        }
        _ => 0,
    }
}

pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return "never".to_string();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|naive| naive.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CdnIdentityResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSelector {
        selected: Mutex<Vec<String>>,
    }

    impl VoiceChannelSelector for RecordingSelector {
        fn select_voice_channel(&self, channel_id: &str) {
            self.selected.lock().unwrap().push(channel_id.to_string());
        }
    }

    fn subject() -> Subject {
        CdnIdentityResolver.resolve_user("7", Some("seven"))
    }

    fn snapshot(in_voice: serde_json::Value) -> ProfileSnapshot {
        serde_json::from_value(json!({
            "victim_id": "7",
            "actual_name": "seven",
            "actual_display_name": "Seven",
            "actual_avatar": "hash",
            "time_in_voice": 7199,
            "last_date_in_voice": "2024-03-05T10:20:30Z",
            "date": "2023-01-01T00:00:00+02:00",
            "in_voice": in_voice,
            "views": 10,
            "likes": 2,
            "dislikes": 1
        }))
        .expect("snapshot")
    }

    #[test]
    fn hours_are_floored() {
        assert_eq!(hours_in_voice(Some(7199.0)), 1);
        assert_eq!(hours_in_voice(Some(7200.0)), 2);
        assert_eq!(hours_in_voice(Some(0.0)), 0);
        assert_eq!(hours_in_voice(Some(-50.0)), 0);
        assert_eq!(hours_in_voice(Some(f64::NAN)), 0);
        assert_eq!(hours_in_voice(None), 0);
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        assert_eq!(
            format_timestamp(Some("2023-01-01T00:00:00+02:00")),
            "2022-12-31 22:00 UTC"
        );
        assert_eq!(
            format_timestamp(Some("2024-03-05T10:20:30.123456")),
            "2024-03-05 10:20 UTC"
        );
        assert_eq!(format_timestamp(Some("yesterday")), "yesterday");
        assert_eq!(format_timestamp(Some("")), "never");
        assert_eq!(format_timestamp(None), "never");
    }

    #[test]
    fn no_voice_presence_means_no_affordance() {
        let view = ProfileView::from_snapshot(snapshot(json!(null)), &subject(), &CdnIdentityResolver);
        let selector = RecordingSelector::default();
        assert!(view.voice.is_none());
        assert!(!view.join_voice(&selector));
        assert!(selector.selected.lock().unwrap().is_empty());
    }

    #[test]
    fn voice_presence_is_derived_and_joinable() {
        let view = ProfileView::from_snapshot(
            snapshot(json!({
                "guild": {"id": "100", "name": "Guild", "icon": "icon"},
                "category": {"id": "200", "name": "Voice"},
                "channel": {
                    "id": "300",
                    "name": "General",
                    "user_limit": 5,
                    "members": [{}, {}],
                    "permission_to_connect": true
                },
                "voice_state": {
                    "self_mute": true,
                    "self_deaf": false,
                    "self_stream": false,
                    "self_video": false
                }
            })),
            &subject(),
            &CdnIdentityResolver,
        );

        assert_eq!(view.display_name, "Seven");
        assert_eq!(view.hours_in_voice, 1);
        assert_eq!(view.last_in_voice, "2024-03-05 10:20 UTC");
        assert_eq!(
            view.avatar_url,
            "https://cdn.discordapp.com/avatars/7/hash.png"
        );

        let voice = view.voice.as_ref().expect("voice view");
        assert_eq!(voice.occupancy_label(), "2/5");
        assert!(voice.can_connect);
        assert!(voice.self_state.self_mute);
        assert_eq!(
            voice.guild_icon_url.as_deref(),
            Some("https://cdn.discordapp.com/icons/100/icon.png")
        );

        let selector = RecordingSelector::default();
        assert!(view.join_voice(&selector));
        assert_eq!(*selector.selected.lock().unwrap(), vec!["300".to_string()]);
    }
}
