use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_name_or_mbid, require_non_empty, ApiRequest};
use crate::core::types::{Album, Paginated, Tag};
use crate::providers::join_tags;

/// Methods in the `album.*` namespace.
pub struct AlbumProvider {
    client: Client,
}

impl AlbumProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Detailed album info by album/artist name pair or by MusicBrainzID.
    /// Supplying `username` adds that user's playcount to the response.
    pub async fn get_info(
        &self,
        album: Option<&str>,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        username: Option<&str>,
    ) -> Result<Album, LastFmError> {
        require_name_or_mbid(album, "album", mbid)?;
        if mbid.is_none() {
            require_non_empty("artist", artist.unwrap_or_default())?;
        }

        let request = ApiRequest::new("album.getInfo")
            .optional_param("album", album)
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .optional_param("username", username);
        let body = self.client.execute(request).await?;
        codec::decode_entity(&body, "album")
    }

    /// Search for an album by name, sorted by relevance.
    pub async fn search(
        &self,
        album: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Album>, LastFmError> {
        require_non_empty("album", album)?;

        let request = ApiRequest::new("album.search")
            .param("album", album)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_search(&body, "albummatches", "album")
    }

    /// Tags applied to this album by a user: the signed-in user by default,
    /// or `username` when supplied.
    pub async fn get_tags(
        &self,
        album: &str,
        artist: &str,
        username: Option<&str>,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_non_empty("album", album)?;
        require_non_empty("artist", artist)?;

        let mut request = ApiRequest::new("album.getTags")
            .param("album", album)
            .param("artist", artist)
            .optional_param("user", username);
        if username.is_none() {
            request = request.authenticated();
        }
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "tags", "tag")
    }

    /// The most applied tags on an album, across all users.
    pub async fn get_top_tags(
        &self,
        album: Option<&str>,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_name_or_mbid(album, "album", mbid)?;

        let request = ApiRequest::new("album.getTopTags")
            .optional_param("album", album)
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "toptags", "tag")
    }

    /// Apply up to 10 user-supplied tags to an album. Requires
    /// authentication.
    pub async fn add_tags(
        &self,
        album: &str,
        artist: &str,
        tags: &[&str],
    ) -> Result<(), LastFmError> {
        require_non_empty("album", album)?;
        require_non_empty("artist", artist)?;
        let tags = join_tags(tags)?;

        let request = ApiRequest::new("album.addTags")
            .param("album", album)
            .param("artist", artist)
            .param("tags", tags)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Remove one of the signed-in user's tags from an album. Requires
    /// authentication.
    pub async fn remove_tag(
        &self,
        album: &str,
        artist: &str,
        tag: &str,
    ) -> Result<(), LastFmError> {
        require_non_empty("album", album)?;
        require_non_empty("artist", artist)?;
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("album.removeTag")
            .param("album", album)
            .param("artist", artist)
            .param("tag", tag)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }
}
