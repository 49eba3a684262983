use tracing::{debug, info};
use tracker_client::{OverlayInstance, VoiceChannelSelector};

/// Keyed stack of open overlays; the top one is current.
#[derive(Default)]
pub struct OverlayStack {
    instances: Vec<OverlayInstance>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `instance` on top of the stack. If an overlay with the same key
    /// is already open it is brought to the top instead and `instance` is
    /// dropped unopened.
    pub fn open(&mut self, mut instance: OverlayInstance) {
        if let Some(position) = self
            .instances
            .iter()
            .position(|existing| existing.key() == instance.key())
        {
            debug!(key = %instance.key(), "overlay already open, focusing it");
            let existing = self.instances.remove(position);
            self.instances.push(existing);
            return;
        }
        instance.open();
        self.instances.push(instance);
    }

    /// Closes and removes the current overlay, returning its key.
    pub fn close_current(&mut self) -> Option<String> {
        let mut instance = self.instances.pop()?;
        instance.close();
        Some(instance.key().to_string())
    }

    pub fn close_all(&mut self) {
        while self.close_current().is_some() {}
    }

    pub fn current(&self) -> Option<&OverlayInstance> {
        self.instances.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut OverlayInstance> {
        self.instances.last_mut()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Voice selection for a terminal: there is no client to move, so the
/// request is reported.
pub struct TerminalVoice;

impl VoiceChannelSelector for TerminalVoice {
    fn select_voice_channel(&self, channel_id: &str) {
        info!(%channel_id, "voice channel selected");
        println!("Selected voice channel {channel_id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{services, StaticApi};
    use std::sync::Arc;
    use tracker_client::overlay::Lifecycle;

    #[tokio::test]
    async fn reopening_a_key_focuses_the_existing_overlay() {
        let api = Arc::new(StaticApi::default());
        let mut stack = OverlayStack::new();
        stack.open(OverlayInstance::for_user("1", None, services(api.clone())));
        stack.open(OverlayInstance::for_user("2", None, services(api.clone())));
        stack.open(OverlayInstance::for_user("1", None, services(api.clone())));

        assert_eq!(stack.len(), 2);
        let current = stack.current_mut().expect("current");
        assert_eq!(current.key(), "tracker-1");
        assert_eq!(current.lifecycle(), Lifecycle::Open);
        current.settle().await.expect("settle");

        stack.close_current();
        let remaining = stack.current_mut().expect("remaining");
        assert_eq!(remaining.key(), "tracker-2");
        remaining.settle().await.expect("settle");

        // The duplicate was never opened, so only two overlays fetched.
        assert_eq!(api.call_count(), 6);
    }

    #[tokio::test]
    async fn closing_pops_the_current_overlay() {
        let api = Arc::new(StaticApi::default());
        let mut stack = OverlayStack::new();
        stack.open(OverlayInstance::for_user("1", None, services(api.clone())));
        stack.open(OverlayInstance::for_user("2", None, services(api)));

        assert_eq!(stack.close_current().as_deref(), Some("tracker-2"));
        assert_eq!(stack.current().map(|i| i.key()), Some("tracker-1"));
        stack.close_all();
        assert!(stack.is_empty());
        assert_eq!(stack.close_current(), None);
    }
}
