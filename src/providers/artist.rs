use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_name_or_mbid, require_non_empty, ApiRequest};
use crate::core::types::{Album, Artist, Paginated, Tag, Track};
use crate::providers::join_tags;

/// Methods in the `artist.*` namespace.
pub struct ArtistProvider {
    client: Client,
}

impl ArtistProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Detailed artist info by name or MusicBrainzID.
    pub async fn get_info(
        &self,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        username: Option<&str>,
    ) -> Result<Artist, LastFmError> {
        require_name_or_mbid(artist, "artist", mbid)?;

        let request = ApiRequest::new("artist.getInfo")
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .optional_param("username", username);
        let body = self.client.execute(request).await?;
        codec::decode_entity(&body, "artist")
    }

    /// Search for an artist by name, sorted by relevance.
    pub async fn search(
        &self,
        artist: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        require_non_empty("artist", artist)?;

        let request = ApiRequest::new("artist.search")
            .param("artist", artist)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_search(&body, "artistmatches", "artist")
    }

    /// Artists similar to the given artist.
    pub async fn get_similar(
        &self,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        limit: Option<u32>,
    ) -> Result<Vec<Artist>, LastFmError> {
        require_name_or_mbid(artist, "artist", mbid)?;

        let request = ApiRequest::new("artist.getSimilar")
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .optional_param("limit", limit.map(|l| l.to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "similarartists", "artist")
    }

    /// Canonical spelling for a misspelled artist name, if the service
    /// proposes one.
    pub async fn get_correction(&self, artist: &str) -> Result<Option<Artist>, LastFmError> {
        require_non_empty("artist", artist)?;

        let request = ApiRequest::new("artist.getCorrection").param("artist", artist);
        let body = self.client.execute(request).await?;
        codec::decode_correction(&body, "artist")
    }

    /// The artist's most popular albums.
    pub async fn get_top_albums(
        &self,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Album>, LastFmError> {
        require_name_or_mbid(artist, "artist", mbid)?;

        let request = ApiRequest::new("artist.getTopAlbums")
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "topalbums", "album")
    }

    /// The artist's most popular tracks.
    pub async fn get_top_tracks(
        &self,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_name_or_mbid(artist, "artist", mbid)?;

        let request = ApiRequest::new("artist.getTopTracks")
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "toptracks", "track")
    }

    /// Tags applied to this artist by a user: the signed-in user by default,
    /// or `username` when supplied.
    pub async fn get_tags(
        &self,
        artist: &str,
        username: Option<&str>,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_non_empty("artist", artist)?;

        let mut request = ApiRequest::new("artist.getTags")
            .param("artist", artist)
            .optional_param("user", username);
        if username.is_none() {
            request = request.authenticated();
        }
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "tags", "tag")
    }

    /// The most applied tags on an artist, across all users.
    pub async fn get_top_tags(
        &self,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_name_or_mbid(artist, "artist", mbid)?;

        let request = ApiRequest::new("artist.getTopTags")
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "toptags", "tag")
    }

    /// Apply up to 10 user-supplied tags to an artist. Requires
    /// authentication.
    pub async fn add_tags(&self, artist: &str, tags: &[&str]) -> Result<(), LastFmError> {
        require_non_empty("artist", artist)?;
        let tags = join_tags(tags)?;

        let request = ApiRequest::new("artist.addTags")
            .param("artist", artist)
            .param("tags", tags)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Remove one of the signed-in user's tags from an artist. Requires
    /// authentication.
    pub async fn remove_tag(&self, artist: &str, tag: &str) -> Result<(), LastFmError> {
        require_non_empty("artist", artist)?;
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("artist.removeTag")
            .param("artist", artist)
            .param("tag", tag)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }
}
