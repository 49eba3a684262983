pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod overlay;
pub mod services;
pub mod telemetry;

pub use api::{TrackerApi, TrackerClient};
pub use config::TrackerConfig;
pub use error::{ApiError, ConfigError};
pub use overlay::{ActiveView, OverlayInstance, Page};
pub use services::{CdnIdentityResolver, IdentityResolver, Services, Subject, VoiceChannelSelector};
