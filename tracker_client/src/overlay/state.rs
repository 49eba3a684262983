/// Outcome of a single fetch as seen by a view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fetch<T> {
    #[default]
    Loading,
    NotFound,
    Ready(T),
}

impl<T> Fetch<T> {
    pub fn from_result(result: Option<T>) -> Self {
        match result {
            Some(value) => Fetch::Ready(value),
            None => Fetch::NotFound,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Fetch::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Sub-views of an overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Profile,
    Guilds,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Profile, Page::Guilds];

    pub fn label(self) -> &'static str {
        match self {
            Page::Profile => "Profile",
            Page::Guilds => "Servers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Opening,
    Open,
    Closed,
}

/// Key under which the host tracks an instance; one per subject user.
pub fn instance_key(user_id: &str) -> String {
    format!("tracker-{user_id}")
}
