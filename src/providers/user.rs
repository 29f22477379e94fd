use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_non_empty, ApiRequest};
use crate::core::types::{
    Album, Artist, Chart, Page, Paginated, Period, Tag, TaggedItems, TaggingType, Track, User,
};
use chrono::{DateTime, Utc};

/// Methods in the `user.*` namespace.
pub struct UserProvider {
    client: Client,
}

impl UserProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Profile information for a user.
    pub async fn get_info(&self, username: &str) -> Result<User, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getInfo").param("user", username);
        let body = self.client.execute(request).await?;
        codec::decode_entity(&body, "user")
    }

    /// A user's friends. `recent_tracks` adds each friend's most recent
    /// listen to the response.
    pub async fn get_friends(
        &self,
        username: &str,
        recent_tracks: bool,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<User>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getFriends")
            .param("user", username)
            .flag_param("recenttracks", recent_tracks)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "friends", "user")
    }

    /// Tracks a user has loved.
    pub async fn get_loved_tracks(
        &self,
        username: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getLovedTracks")
            .param("user", username)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "lovedtracks", "track")
    }

    /// A user's listening history, newest first, optionally bounded to a
    /// time range.
    pub async fn get_recent_tracks(
        &self,
        username: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getRecentTracks")
            .param("user", username)
            .optional_param("from", from.map(|t| t.timestamp().to_string()))
            .optional_param("to", to.map(|t| t.timestamp().to_string()))
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "recenttracks", "track")
    }

    /// A user's most played albums over a period.
    pub async fn get_top_albums(
        &self,
        username: &str,
        period: Option<Period>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Album>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getTopAlbums")
            .param("user", username)
            .optional_param("period", period.map(Period::as_str))
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "topalbums", "album")
    }

    /// A user's most played artists over a period.
    pub async fn get_top_artists(
        &self,
        username: &str,
        period: Option<Period>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Artist>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getTopArtists")
            .param("user", username)
            .optional_param("period", period.map(Period::as_str))
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "topartists", "artist")
    }

    /// A user's most played tracks over a period.
    pub async fn get_top_tracks(
        &self,
        username: &str,
        period: Option<Period>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getTopTracks")
            .param("user", username)
            .optional_param("period", period.map(Period::as_str))
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_paginated(&body, "toptracks", "track")
    }

    /// The tags a user applies most.
    pub async fn get_top_tags(
        &self,
        username: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getTopTags")
            .param("user", username)
            .optional_param("limit", limit.map(|l| l.to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "toptags", "tag")
    }

    /// Items a user has tagged with a particular tag, filtered by the
    /// declared entity kind. The response shape is identical across kinds,
    /// so the decoder checks the payload against `kind` and rejects a
    /// mismatch as caller misuse.
    pub async fn get_personal_tags(
        &self,
        username: &str,
        tag: &str,
        kind: TaggingType,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<(TaggedItems, Page), LastFmError> {
        require_non_empty("user", username)?;
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("user.getPersonalTags")
            .param("user", username)
            .param("tag", tag)
            .param("taggingtype", kind.as_str())
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_taggings(&body, kind)
    }

    /// Date ranges of the available weekly charts for a user.
    pub async fn get_weekly_chart_list(&self, username: &str) -> Result<Vec<Chart>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getWeeklyChartList").param("user", username);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "weeklychartlist", "chart")
    }

    /// A user's album chart for a week. Defaults to the most recent week
    /// when no range is given.
    pub async fn get_weekly_album_chart(
        &self,
        username: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Album>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getWeeklyAlbumChart")
            .param("user", username)
            .optional_param("from", from.map(|t| t.timestamp().to_string()))
            .optional_param("to", to.map(|t| t.timestamp().to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "weeklyalbumchart", "album")
    }

    /// A user's artist chart for a week.
    pub async fn get_weekly_artist_chart(
        &self,
        username: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Artist>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getWeeklyArtistChart")
            .param("user", username)
            .optional_param("from", from.map(|t| t.timestamp().to_string()))
            .optional_param("to", to.map(|t| t.timestamp().to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "weeklyartistchart", "artist")
    }

    /// A user's track chart for a week.
    pub async fn get_weekly_track_chart(
        &self,
        username: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Track>, LastFmError> {
        require_non_empty("user", username)?;

        let request = ApiRequest::new("user.getWeeklyTrackChart")
            .param("user", username)
            .optional_param("from", from.map(|t| t.timestamp().to_string()))
            .optional_param("to", to.map(|t| t.timestamp().to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "weeklytrackchart", "track")
    }
}
