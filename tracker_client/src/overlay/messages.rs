use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{CommentPage, GuildMembership, ProfileSnapshot};

use super::guilds::guild_rows;
use super::profile::ProfileView;
use super::state::{Fetch, Lifecycle};
use super::OverlayInstance;

pub enum OverlayMessage {
    ProfileLoaded(Result<Option<ProfileSnapshot>, ApiError>),
    GuildsLoaded(Result<Option<Vec<GuildMembership>>, ApiError>),
    CommentsLoaded {
        page: Option<u32>,
        result: Result<Option<CommentPage>, ApiError>,
    },
}

impl OverlayMessage {
    fn kind(&self) -> &'static str {
        match self {
            OverlayMessage::ProfileLoaded(_) => "profile",
            OverlayMessage::GuildsLoaded(_) => "guilds",
            OverlayMessage::CommentsLoaded { .. } => "comments",
        }
    }
}

/// Applies one fetch result to the instance. Results arriving after the
/// instance closed are discarded. A malformed body is returned to the caller
/// and leaves the affected view untouched.
pub(super) fn handle_message(
    instance: &mut OverlayInstance,
    message: OverlayMessage,
) -> Result<(), ApiError> {
    if instance.lifecycle != Lifecycle::Open {
        debug!(
            key = %instance.key,
            kind = message.kind(),
            lifecycle = ?instance.lifecycle,
            "discarding result for inactive overlay"
        );
        return Ok(());
    }

    match message {
        OverlayMessage::ProfileLoaded(result) => {
            let snapshot = result?;
            info!(key = %instance.key, found = snapshot.is_some(), "profile loaded");
            let identity = instance.services.identity.as_ref();
            let subject = &instance.subject;
            instance.profile = Fetch::from_result(
                snapshot.map(|snapshot| ProfileView::from_snapshot(snapshot, subject, identity)),
            );
        }
        OverlayMessage::GuildsLoaded(result) => {
            let guilds = result?;
            info!(key = %instance.key, found = guilds.is_some(), "guilds loaded");
            let identity = instance.services.identity.as_ref();
            instance.guilds = Fetch::from_result(guilds.map(|guilds| guild_rows(guilds, identity)));
        }
        OverlayMessage::CommentsLoaded { page, result } => {
            let comments = result?;
            info!(key = %instance.key, ?page, found = comments.is_some(), "comments loaded");
            instance.comments.apply(comments);
        }
    }
    Ok(())
}
