use tracker_client::models::Comment;
use tracker_client::overlay::{CommentFeed, FeedStatus, Fetch, GuildRow, ProfileView};
use tracker_client::{ActiveView, OverlayInstance, Page};

const INDENT: &str = "    ";

/// Text for the current state of an overlay: header, page tabs and the
/// active page.
pub fn render_instance(instance: &OverlayInstance) -> String {
    let mut lines = vec![
        format!("== {} ({}) ==", instance.subject().username, instance.key()),
        render_tabs(instance.page()),
        String::new(),
    ];
    match instance.active_view() {
        ActiveView::Profile { profile, comments } => {
            render_profile(&mut lines, profile);
            lines.push(String::new());
            render_comments(&mut lines, instance, comments);
        }
        ActiveView::Guilds(guilds) => render_guilds(&mut lines, guilds),
    }
    lines.push(String::new());
    lines.join("\n")
}

fn render_tabs(active: Page) -> String {
    Page::ALL
        .iter()
        .map(|page| {
            if *page == active {
                format!("[{}]", page.label())
            } else {
                page.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_profile(lines: &mut Vec<String>, profile: &Fetch<ProfileView>) {
    let profile = match profile {
        Fetch::Loading => {
            lines.push("loading...".into());
            return;
        }
        Fetch::NotFound => {
            lines.push("user not found".into());
            return;
        }
        Fetch::Ready(profile) => profile,
    };

    lines.push(format!("{}  {}", profile.display_name, profile.avatar_url));
    lines.push(format!("Time in voice: {}h", profile.hours_in_voice));
    lines.push(format!("Last time in voice: {}", profile.last_in_voice));
    if let Some(since) = &profile.tracked_since {
        lines.push(format!("Tracked since: {since}"));
    }
    lines.push(format!("Views: {}", profile.snapshot.views));
    lines.push(format!("Likes: {}", profile.snapshot.likes));
    lines.push(format!("Dislikes: {}", profile.snapshot.dislikes));

    if let Some(voice) = &profile.voice {
        let mut flags = Vec::new();
        if voice.self_state.self_mute {
            flags.push("muted");
        }
        if voice.self_state.self_deaf {
            flags.push("deafened");
        }
        if voice.self_state.self_stream {
            flags.push("streaming");
        }
        if voice.self_state.self_video {
            flags.push("video");
        }
        lines.push(format!(
            "In voice: {} / {} / {} ({}){}",
            voice.guild_name,
            voice.category_name,
            voice.channel_name,
            voice.occupancy_label(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            }
        ));
        if voice.can_connect {
            lines.push("  `join` to connect".into());
        }
    }
}

fn render_comments(lines: &mut Vec<String>, instance: &OverlayInstance, feed: &CommentFeed) {
    match feed.status() {
        FeedStatus::NotFound => {
            lines.push("couldn't fetch comments".into());
            return;
        }
        FeedStatus::Loading if feed.paginator().is_none() => {
            lines.push("loading comments...".into());
            return;
        }
        _ => {}
    }

    lines.push(format!(
        "-- Comments ({} of {}) --",
        feed.len(),
        feed.total_count()
    ));
    for comment in feed.comments() {
        render_comment(lines, instance, comment, 0);
    }

    match feed.status() {
        FeedStatus::Loading => lines.push("loading more...".into()),
        FeedStatus::Failed => {
            lines.push("couldn't fetch more comments; `more` tries again".into())
        }
        _ if feed.has_next() => lines.push("`more` to load more".into()),
        _ => {}
    }
}

fn render_comment(lines: &mut Vec<String>, instance: &OverlayInstance, comment: &Comment, depth: usize) {
    let indent = INDENT.repeat(depth);
    lines.push(format!(
        "{indent}#{} {} ({} likes) {}",
        comment.comment_id,
        comment.author_name(),
        comment.likes_count,
        instance.comment_avatar_url(comment)
    ));
    lines.push(format!("{indent}{INDENT}{}", comment.content));
    for reply in &comment.replies {
        render_comment(lines, instance, reply, depth + 1);
    }
}

fn render_guilds(lines: &mut Vec<String>, guilds: &Fetch<Vec<GuildRow>>) {
    match guilds {
        Fetch::Loading => lines.push("loading...".into()),
        Fetch::NotFound => lines.push("not found".into()),
        Fetch::Ready(rows) if rows.is_empty() => lines.push("no mutual servers".into()),
        Fetch::Ready(rows) => {
            for row in rows {
                lines.push(format!("{}  {}", row.name, row.counts_label()));
                if let Some(icon) = &row.icon_url {
                    lines.push(format!("{INDENT}{icon}"));
                }
            }
        }
    }
}
