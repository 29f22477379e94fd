//! Per-namespace providers: thin consumers of the request/decoding pipeline.
//!
//! Each method assembles entity-specific parameters, validates caller input
//! locally and delegates to the client for finalization, signing, dispatch
//! and decoding. Methods marked "requires authentication" resolve with
//! [`crate::LastFmError::AuthenticationRequired`] when called signed out,
//! without touching the network.

pub mod album;
pub mod artist;
pub mod chart;
pub mod geo;
pub mod library;
pub mod tag;
pub mod track;
pub mod user;

pub use album::AlbumProvider;
pub use artist::ArtistProvider;
pub use chart::ChartProvider;
pub use geo::GeoProvider;
pub use library::LibraryProvider;
pub use tag::TagProvider;
pub use track::TrackProvider;
pub use user::UserProvider;

use crate::core::errors::LastFmError;

/// Maximum number of tags a single add-tags call accepts.
pub const MAX_TAGS_PER_CALL: usize = 10;

/// Validate and serialize a tag batch into the comma-separated wire form.
pub(crate) fn join_tags(tags: &[&str]) -> Result<String, LastFmError> {
    if tags.is_empty() {
        return Err(LastFmError::invalid_parameter(
            "tags",
            "at least one tag is required",
        ));
    }
    if tags.len() > MAX_TAGS_PER_CALL {
        return Err(LastFmError::invalid_parameter(
            "tags",
            &format!("at most {} tags may be sent per call", MAX_TAGS_PER_CALL),
        ));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(LastFmError::invalid_parameter(
            "tags",
            "tags must not be empty",
        ));
    }
    Ok(tags.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_batches_are_bounded() {
        assert!(join_tags(&[]).is_err());
        assert_eq!(join_tags(&["pop", "dance"]).unwrap(), "pop,dance");

        let eleven: Vec<&str> = std::iter::repeat("tag").take(11).collect();
        assert!(join_tags(&eleven).is_err());

        assert!(join_tags(&["pop", " "]).is_err());
    }
}
