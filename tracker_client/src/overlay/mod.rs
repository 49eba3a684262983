//! One opened tracker overlay for a subject user.
//!
//! An instance moves `Opening -> Open -> Closed`. Opening it spawns the
//! profile, guild and first comment-page fetches; their results come back as
//! [`OverlayMessage`]s and are applied on the thread that owns the instance by
//! [`OverlayInstance::process_messages`] or [`OverlayInstance::settle`]. Once
//! closed, late results are discarded.
//!
//! Opening a comment author creates a new, unrelated instance; nothing is
//! shared with the parent except the collaborator handles.

use flume::{Receiver, Sender};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::Comment;
use crate::services::{Services, Subject};

pub mod feed;
pub mod guilds;
mod messages;
pub mod profile;
pub mod state;
mod tasks;

pub use feed::{CommentFeed, FeedStatus, PageRequestError};
pub use guilds::GuildRow;
pub use messages::OverlayMessage;
pub use profile::{ProfileView, VoiceView};
pub use state::{instance_key, Fetch, Lifecycle, Page};

/// What the host should render for the active page.
#[derive(Debug, Clone, Copy)]
pub enum ActiveView<'a> {
    Profile {
        profile: &'a Fetch<ProfileView>,
        comments: &'a CommentFeed,
    },
    Guilds(&'a Fetch<Vec<GuildRow>>),
}

pub struct OverlayInstance {
    key: String,
    subject: Subject,
    services: Services,
    lifecycle: Lifecycle,
    page: Page,
    profile: Fetch<ProfileView>,
    guilds: Fetch<Vec<GuildRow>>,
    comments: CommentFeed,
    tx: Sender<OverlayMessage>,
    rx: Receiver<OverlayMessage>,
    pending: usize,
}

impl OverlayInstance {
    pub fn new(subject: Subject, services: Services) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            key: instance_key(&subject.id),
            subject,
            services,
            lifecycle: Lifecycle::Opening,
            page: Page::default(),
            profile: Fetch::Loading,
            guilds: Fetch::Loading,
            comments: CommentFeed::new(),
            tx,
            rx,
            pending: 0,
        }
    }

    /// Builds an instance for `user_id`, resolving its display identity.
    pub fn for_user(user_id: &str, name_hint: Option<&str>, services: Services) -> Self {
        let subject = services.identity.resolve_user(user_id, name_hint);
        Self::new(subject, services)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn profile(&self) -> &Fetch<ProfileView> {
        &self.profile
    }

    pub fn guilds(&self) -> &Fetch<Vec<GuildRow>> {
        &self.guilds
    }

    pub fn comments(&self) -> &CommentFeed {
        &self.comments
    }

    /// Fetches spawned but not yet received, including ones that will be
    /// discarded.
    pub fn pending_fetches(&self) -> usize {
        self.pending
    }

    /// Moves an opening instance to `Open` and starts its fetches. Returns
    /// `false` if the instance was already opened or closed.
    pub fn open(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Opening {
            debug!(key = %self.key, lifecycle = ?self.lifecycle, "open ignored");
            return false;
        }
        self.lifecycle = Lifecycle::Open;
        info!(key = %self.key, "overlay opened");

        let runtime = self.services.runtime.clone();
        let user_id = self.subject.id.clone();
        tasks::load_profile(
            &runtime,
            self.services.api.clone(),
            self.tx.clone(),
            user_id.clone(),
        );
        tasks::load_guilds(
            &runtime,
            self.services.api.clone(),
            self.tx.clone(),
            user_id.clone(),
        );
        self.pending += 2;

        if self.comments.begin_first_page().is_ok() {
            tasks::load_comments(&runtime, self.services.api.clone(), self.tx.clone(), user_id, None);
            self.pending += 1;
        }
        true
    }

    pub fn close(&mut self) {
        if self.lifecycle != Lifecycle::Closed {
            info!(key = %self.key, pending = self.pending, "overlay closed");
            self.lifecycle = Lifecycle::Closed;
        }
    }

    pub fn select_page(&mut self, page: Page) {
        if self.page != page {
            debug!(key = %self.key, from = ?self.page, to = ?page, "page switched");
            self.page = page;
        }
    }

    pub fn active_view(&self) -> ActiveView<'_> {
        match self.page {
            Page::Profile => ActiveView::Profile {
                profile: &self.profile,
                comments: &self.comments,
            },
            Page::Guilds => ActiveView::Guilds(&self.guilds),
        }
    }

    /// "Load more": fetches the next comment page when one exists and no
    /// other comment fetch is in flight. Rejected requests issue no fetch.
    pub fn request_next_page(&mut self) -> Result<u32, PageRequestError> {
        if !self.is_open() {
            return Err(PageRequestError::Closed);
        }
        let page = self.comments.request_next_page()?;
        info!(key = %self.key, page, "requesting comment page");
        tasks::load_comments(
            &self.services.runtime,
            self.services.api.clone(),
            self.tx.clone(),
            self.subject.id.clone(),
            Some(page),
        );
        self.pending += 1;
        Ok(page)
    }

    /// Joins the subject's current voice channel. Returns `false` when the
    /// profile is not loaded or the subject is not in voice.
    pub fn join_voice(&self) -> bool {
        self.profile
            .ready()
            .map(|profile| profile.join_voice(self.services.voice.as_ref()))
            .unwrap_or(false)
    }

    /// A fresh, unopened instance for the author of `comment`. Anonymous
    /// comments have no author to open.
    pub fn open_comment_author(&self, comment: &Comment) -> Option<OverlayInstance> {
        let author_id = comment.author_id()?;
        Some(Self::for_user(
            author_id,
            comment.name.as_deref(),
            self.services.clone(),
        ))
    }

    pub fn find_comment(&self, comment_id: i64) -> Option<&Comment> {
        fn search(comments: &[Comment], comment_id: i64) -> Option<&Comment> {
            comments.iter().find_map(|comment| {
                if comment.comment_id == comment_id {
                    Some(comment)
                } else {
                    search(&comment.replies, comment_id)
                }
            })
        }
        search(self.comments.comments(), comment_id)
    }

    /// Anonymous comments show the subject's default avatar.
    pub fn comment_avatar_url(&self, comment: &Comment) -> String {
        let identity = self.services.identity.as_ref();
        match comment.author_id() {
            Some(author_id) => identity.user_avatar_url(author_id, comment.avatar.as_deref()),
            None => identity.default_avatar_url(&self.subject.id),
        }
    }

    /// Applies every result that has already arrived, returning how many
    /// were received.
    pub fn process_messages(&mut self) -> Result<usize, ApiError> {
        let mut received = 0;
        while let Ok(message) = self.rx.try_recv() {
            received += 1;
            self.receive(message)?;
        }
        Ok(received)
    }

    /// Waits until every spawned fetch has reported back.
    pub async fn settle(&mut self) -> Result<(), ApiError> {
        while self.pending > 0 {
            let Ok(message) = self.rx.recv_async().await else {
                break;
            };
            self.receive(message)?;
        }
        Ok(())
    }

    fn receive(&mut self, message: OverlayMessage) -> Result<(), ApiError> {
        self.pending = self.pending.saturating_sub(1);
        messages::handle_message(self, message)
    }
}
