use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::ApiRequest;
use crate::core::types::{Artist, Paginated, Tag, Track};

/// Methods in the `chart.*` namespace: service-wide popularity charts.
pub struct ChartProvider {
    client: Client,
}

impl ChartProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_top_artists(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        let request = ApiRequest::new("chart.getTopArtists").pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "artists", "artist")
    }

    pub async fn get_top_tags(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Tag>, LastFmError> {
        let request = ApiRequest::new("chart.getTopTags").pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "tags", "tag")
    }

    pub async fn get_top_tracks(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        let request = ApiRequest::new("chart.getTopTracks").pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "tracks", "track")
    }
}
