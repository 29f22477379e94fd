use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_non_empty, ApiRequest};
use crate::core::types::{Artist, Paginated, Track};

/// Methods in the `geo.*` namespace: per-country popularity charts.
/// Countries are named per ISO 3166-1.
pub struct GeoProvider {
    client: Client,
}

impl GeoProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_top_artists(
        &self,
        country: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        require_non_empty("country", country)?;

        let request = ApiRequest::new("geo.getTopArtists")
            .param("country", country)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "topartists", "artist")
    }

    pub async fn get_top_tracks(
        &self,
        country: &str,
        location: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("country", country)?;

        let request = ApiRequest::new("geo.getTopTracks")
            .param("country", country)
            .optional_param("location", location)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "tracks", "track")
    }
}
