use serde::{Deserialize, Deserializer, Serialize};

// Wire shapes returned by the tracker service.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub victim_id: String,
    #[serde(default)]
    pub actual_name: Option<String>,
    #[serde(default)]
    pub actual_display_name: Option<String>,
    #[serde(default)]
    pub actual_avatar: Option<String>,
    /// Seconds spent in voice channels.
    #[serde(default)]
    pub time_in_voice: Option<f64>,
    #[serde(default)]
    pub last_date_in_voice: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub in_voice: Option<VoicePresence>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    #[serde(default)]
    pub is_self_victim: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub is_remove_perm: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePresence {
    pub guild: VoiceGuild,
    pub category: VoiceCategory,
    pub channel: VoiceChannel,
    pub voice_state: VoiceSelfState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceGuild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCategory {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceChannel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user_limit: u32,
    #[serde(default)]
    pub members: Vec<serde_json::Value>,
    #[serde(default)]
    pub permission_to_connect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoiceSelfState {
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_stream: bool,
    #[serde(default)]
    pub self_video: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMembership {
    pub id: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub name: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub voice_member_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildListResponse {
    pub guild_list: Vec<GuildMembership>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Commenting user's id; absent for anonymous comments.
    #[serde(default)]
    pub id: Option<String>,
    pub comment_id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Anon")
    }

    /// Id of the author that can be opened in a new overlay, if any.
    pub fn author_id(&self) -> Option<&str> {
        if self.is_anonymous {
            return None;
        }
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginator {
    pub number: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
    #[serde(default)]
    pub has_other_pages: bool,
    #[serde(default, deserialize_with = "page_or_false")]
    pub next_page_number: Option<u32>,
    #[serde(default, deserialize_with = "page_or_false")]
    pub previous_page_number: Option<u32>,
    #[serde(default)]
    pub page_ranger: Vec<u32>,
}

impl Paginator {
    /// The page to request next, only when the server says one exists.
    pub fn next_page(&self) -> Option<u32> {
        if self.has_next {
            self.next_page_number
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub item_count: u64,
    #[serde(default)]
    pub comments_list: Vec<Comment>,
    pub paginator: Paginator,
}

/// Page links arrive either as a number or as `false`.
fn page_or_false<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PageLink {
        Page(u32),
        Flag(bool),
        Missing(Option<()>),
    }

    Ok(match PageLink::deserialize(deserializer)? {
        PageLink::Page(page) => Some(page),
        PageLink::Flag(_) | PageLink::Missing(_) => None,
    })
}
