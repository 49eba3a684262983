use std::sync::Arc;

use flume::Sender;
use tokio::runtime::Handle;
use tracing::debug;

use crate::api::TrackerApi;

use super::messages::OverlayMessage;

// Each task performs exactly one round trip and reports back to the owning
// instance. A failed send means the instance is gone; the result is dropped.

pub fn load_profile(
    runtime: &Handle,
    api: Arc<dyn TrackerApi>,
    tx: Sender<OverlayMessage>,
    user_id: String,
) {
    runtime.spawn(async move {
        let result = api.fetch_profile(&user_id).await;
        if tx.send(OverlayMessage::ProfileLoaded(result)).is_err() {
            debug!(%user_id, "overlay dropped before profile arrived");
        }
    });
}

pub fn load_guilds(
    runtime: &Handle,
    api: Arc<dyn TrackerApi>,
    tx: Sender<OverlayMessage>,
    user_id: String,
) {
    runtime.spawn(async move {
        let result = api.fetch_guilds(&user_id).await;
        if tx.send(OverlayMessage::GuildsLoaded(result)).is_err() {
            debug!(%user_id, "overlay dropped before guilds arrived");
        }
    });
}

pub fn load_comments(
    runtime: &Handle,
    api: Arc<dyn TrackerApi>,
    tx: Sender<OverlayMessage>,
    user_id: String,
    page: Option<u32>,
) {
    runtime.spawn(async move {
        let result = api.fetch_comments(&user_id, page).await;
        if tx.send(OverlayMessage::CommentsLoaded { page, result }).is_err() {
            debug!(%user_id, ?page, "overlay dropped before comments arrived");
        }
    });
}
