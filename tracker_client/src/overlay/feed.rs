use thiserror::Error;
use tracing::debug;

use crate::models::{Comment, CommentPage, Paginator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// Waiting for the first page, or for a page requested with "load more".
    #[default]
    Loading,
    /// The first page could not be fetched. Terminal for the session.
    NotFound,
    Loaded,
    /// A later page could not be fetched. Accumulated comments are kept.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    #[error("the overlay is not open")]
    Closed,
    #[error("comments are still loading")]
    NotLoaded,
    #[error("comments could not be fetched")]
    NotFound,
    #[error("a comment page is already being fetched")]
    InFlight,
    #[error("there are no more comment pages")]
    NoMorePages,
}

/// Append-only accumulation of comment pages for one overlay instance.
///
/// The feed only tracks state; the owning instance performs the fetch
/// between `begin_*` and `apply`.
#[derive(Debug, Clone, Default)]
pub struct CommentFeed {
    comments: Vec<Comment>,
    item_count: u64,
    paginator: Option<Paginator>,
    status: FeedStatus,
    // Some(None) = first page in flight, Some(Some(n)) = page n in flight.
    in_flight: Option<Option<u32>>,
}

impl CommentFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Pagination metadata of the most recent successful page.
    pub fn paginator(&self) -> Option<&Paginator> {
        self.paginator.as_ref()
    }

    pub fn current_page(&self) -> Option<u32> {
        self.paginator.as_ref().map(|paginator| paginator.number)
    }

    pub fn total_count(&self) -> u64 {
        self.item_count
    }

    pub fn page_ranger(&self) -> &[u32] {
        self.paginator
            .as_ref()
            .map(|paginator| paginator.page_ranger.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a "load more" affordance should be offered.
    pub fn has_next(&self) -> bool {
        matches!(self.status, FeedStatus::Loaded | FeedStatus::Failed)
            && self.next_page().is_some()
    }

    fn next_page(&self) -> Option<u32> {
        self.paginator.as_ref().and_then(Paginator::next_page)
    }

    /// Marks the first page as in flight.
    pub fn begin_first_page(&mut self) -> Result<(), PageRequestError> {
        if self.in_flight.is_some() {
            return Err(PageRequestError::InFlight);
        }
        self.status = FeedStatus::Loading;
        self.in_flight = Some(None);
        Ok(())
    }

    /// Validates a "load more" request and marks the next page as in flight,
    /// returning the page number to fetch.
    pub fn request_next_page(&mut self) -> Result<u32, PageRequestError> {
        if self.in_flight.is_some() {
            return Err(PageRequestError::InFlight);
        }
        match self.status {
            FeedStatus::Loading => return Err(PageRequestError::NotLoaded),
            FeedStatus::NotFound => return Err(PageRequestError::NotFound),
            FeedStatus::Loaded | FeedStatus::Failed => {}
        }
        let page = self.next_page().ok_or(PageRequestError::NoMorePages)?;
        self.status = FeedStatus::Loading;
        self.in_flight = Some(Some(page));
        Ok(page)
    }

    /// Applies the result of the in-flight fetch. Returns `false` when no
    /// fetch was in flight and the result was ignored.
    pub fn apply(&mut self, result: Option<CommentPage>) -> bool {
        let Some(requested) = self.in_flight.take() else {
            debug!("ignoring comment page with no request in flight");
            return false;
        };

        match result {
            Some(page) => {
                debug!(
                    ?requested,
                    page = page.paginator.number,
                    received = page.comments_list.len(),
                    "comment page applied"
                );
                self.comments.extend(page.comments_list);
                self.item_count = page.item_count;
                self.paginator = Some(page.paginator);
                self.status = FeedStatus::Loaded;
            }
            None if self.paginator.is_none() => {
                self.status = FeedStatus::NotFound;
            }
            None => {
                self.status = FeedStatus::Failed;
            }
        }
        true
    }
}
