//! Typed async client for the Last.fm web API.
//!
//! Requests are finalized, signed where the service requires it and
//! dispatched through a pluggable transport; responses are decoded into
//! typed entities, lists and paginated results with unified error
//! classification. Session acquisition, persistence and restoration are
//! handled by the built-in session manager.

pub mod client;
pub mod core;
pub mod providers;

pub use crate::client::Client;
pub use crate::core::config::{ClientConfig, ConfigError};
pub use crate::core::errors::LastFmError;
pub use crate::core::kernel::{RequestHandle, Transport, WireRequest};
pub use crate::core::session::{
    FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore, SubscriberStatus,
};
pub use crate::core::types::{
    Album, Artist, ArtistRef, Chart, Image, Page, Paginated, Period, ScrobbleResult,
    ScrobbleTrack, Stats, Tag, TaggedItems, TaggingType, Track, User, Wiki,
};
