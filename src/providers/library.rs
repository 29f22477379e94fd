use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_non_empty, ApiRequest};
use crate::core::types::{Artist, Paginated};

/// Methods in the `library.*` namespace.
pub struct LibraryProvider {
    client: Client,
}

impl LibraryProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// All artists in a user's library, with playcounts and tag counts.
    pub async fn get_artists(
        &self,
        username: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("library.getArtists")
            .param("user", username)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "artists", "artist")
    }
}
