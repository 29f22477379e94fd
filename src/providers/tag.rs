use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_non_empty, ApiRequest};
use crate::core::types::{Album, Artist, Chart, Paginated, Tag, Track};

/// Methods in the `tag.*` namespace.
pub struct TagProvider {
    client: Client,
}

impl TagProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Metadata for a tag, including its wiki entry.
    pub async fn get_info(&self, tag: &str) -> Result<Tag, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getInfo").param("tag", tag);
        let body = self.client.execute(request).await?;
        codec::decode_entity(&body, "tag")
    }

    /// Tags similar to the given tag, ranked by similarity.
    pub async fn get_similar(&self, tag: &str) -> Result<Vec<Tag>, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getSimilar").param("tag", tag);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "similartags", "tag")
    }

    /// The most used tags on the service overall.
    pub async fn get_top_tags(&self) -> Result<Vec<Tag>, LastFmError> {
        let request = ApiRequest::new("tag.getTopTags");
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "toptags", "tag")
    }

    /// The most popular albums carrying a tag.
    pub async fn get_top_albums(
        &self,
        tag: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Album>, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getTopAlbums")
            .param("tag", tag)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "albums", "album")
    }

    /// The most popular artists carrying a tag.
    pub async fn get_top_artists(
        &self,
        tag: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getTopArtists")
            .param("tag", tag)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "topartists", "artist")
    }

    /// The most popular tracks carrying a tag.
    pub async fn get_top_tracks(
        &self,
        tag: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getTopTracks")
            .param("tag", tag)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "tracks", "track")
    }

    /// Date ranges of the available weekly charts for a tag.
    pub async fn get_weekly_chart_list(&self, tag: &str) -> Result<Vec<Chart>, LastFmError> {
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("tag.getWeeklyChartList").param("tag", tag);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "weeklychartlist", "chart")
    }
}
