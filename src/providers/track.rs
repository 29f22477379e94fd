use crate::client::Client;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{require_name_or_mbid, require_non_empty, ApiRequest};
use crate::core::types::{Paginated, ScrobbleResult, ScrobbleTrack, Tag, Track};
use crate::providers::join_tags;

/// Maximum number of tracks one scrobble call accepts.
pub const MAX_SCROBBLE_BATCH: usize = 50;

/// Methods in the `track.*` namespace, including the scrobbling API.
pub struct TrackProvider {
    client: Client,
}

impl TrackProvider {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Detailed track info by name and artist, or by MusicBrainzID.
    /// Supplying `username` adds that user's playcount and loved flag to the
    /// response.
    pub async fn get_info(
        &self,
        track: Option<&str>,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        username: Option<&str>,
    ) -> Result<Track, LastFmError> {
        require_name_or_mbid(track, "track", mbid)?;
        if mbid.is_none() {
            require_non_empty("artist", artist.unwrap_or_default())?;
        }

        let request = ApiRequest::new("track.getInfo")
            .optional_param("track", track)
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .optional_param("username", username);
        let body = self.client.execute(request).await?;
        codec::decode_entity(&body, "track")
    }

    /// Search for a track by name, optionally narrowed by artist. Matches are
    /// sorted by relevance.
    pub async fn search(
        &self,
        track: &str,
        artist: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<Track>, LastFmError> {
        require_non_empty("track", track)?;

        let request = ApiRequest::new("track.search")
            .param("track", track)
            .optional_param("artist", artist)
            .pagination(page, limit)?;
        let body = self.client.execute(request).await?;
        codec::decode_search(&body, "trackmatches", "track")
    }

    /// Tracks similar to the given track.
    pub async fn get_similar(
        &self,
        track: Option<&str>,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
        limit: Option<u32>,
    ) -> Result<Vec<Track>, LastFmError> {
        require_name_or_mbid(track, "track", mbid)?;

        let request = ApiRequest::new("track.getSimilar")
            .optional_param("track", track)
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect)
            .optional_param("limit", limit.map(|l| l.to_string()));
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "similartracks", "track")
    }

    /// Canonical spelling for a misspelled track/artist pair, if the service
    /// proposes one.
    pub async fn get_correction(
        &self,
        track: &str,
        artist: &str,
    ) -> Result<Option<Track>, LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;

        let request = ApiRequest::new("track.getCorrection")
            .param("track", track)
            .param("artist", artist);
        let body = self.client.execute(request).await?;
        codec::decode_correction(&body, "track")
    }

    /// Tags applied to this track by a user: the signed-in user by default,
    /// or `username` when supplied.
    pub async fn get_tags(
        &self,
        track: &str,
        artist: &str,
        username: Option<&str>,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;

        let mut request = ApiRequest::new("track.getTags")
            .param("track", track)
            .param("artist", artist)
            .optional_param("user", username);
        if username.is_none() {
            request = request.authenticated();
        }
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "tags", "tag")
    }

    /// The most applied tags on a track, across all users.
    pub async fn get_top_tags(
        &self,
        track: Option<&str>,
        artist: Option<&str>,
        mbid: Option<&str>,
        autocorrect: bool,
    ) -> Result<Vec<Tag>, LastFmError> {
        require_name_or_mbid(track, "track", mbid)?;

        let request = ApiRequest::new("track.getTopTags")
            .optional_param("track", track)
            .optional_param("artist", artist)
            .optional_param("mbid", mbid)
            .flag_param("autocorrect", autocorrect);
        let body = self.client.execute(request).await?;
        codec::decode_list(&body, "toptags", "tag")
    }

    /// Love a track for the signed-in user's profile. Requires
    /// authentication.
    pub async fn love(&self, track: &str, artist: &str) -> Result<(), LastFmError> {
        self.loved(track, artist, true).await
    }

    /// Un-love a previously loved track. Requires authentication.
    pub async fn unlove(&self, track: &str, artist: &str) -> Result<(), LastFmError> {
        self.loved(track, artist, false).await
    }

    async fn loved(&self, track: &str, artist: &str, loved: bool) -> Result<(), LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;

        let method = if loved { "track.love" } else { "track.unlove" };
        let request = ApiRequest::new(method)
            .param("track", track)
            .param("artist", artist)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Apply up to 10 user-supplied tags to a track. Requires
    /// authentication.
    pub async fn add_tags(
        &self,
        track: &str,
        artist: &str,
        tags: &[&str],
    ) -> Result<(), LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;
        let tags = join_tags(tags)?;

        let request = ApiRequest::new("track.addTags")
            .param("track", track)
            .param("artist", artist)
            .param("tags", tags)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Remove one of the signed-in user's tags from a track. Requires
    /// authentication.
    pub async fn remove_tag(
        &self,
        track: &str,
        artist: &str,
        tag: &str,
    ) -> Result<(), LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;
        require_non_empty("tag", tag)?;

        let request = ApiRequest::new("track.removeTag")
            .param("track", track)
            .param("artist", artist)
            .param("tag", tag)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Notify the service that a track has started playing. Requires
    /// authentication.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_now_playing(
        &self,
        track: &str,
        artist: &str,
        album: Option<&str>,
        track_number: Option<u32>,
        album_artist: Option<&str>,
        duration: Option<u32>,
        mbid: Option<&str>,
    ) -> Result<(), LastFmError> {
        require_non_empty("track", track)?;
        require_non_empty("artist", artist)?;

        let request = ApiRequest::new("track.updateNowPlaying")
            .param("track", track)
            .param("artist", artist)
            .optional_param("album", album)
            .optional_param("trackNumber", track_number.map(|n| n.to_string()))
            .optional_param("albumArtist", album_artist)
            .optional_param("duration", duration.map(|d| d.to_string()))
            .optional_param("mbid", mbid)
            .authenticated();
        let body = self.client.execute(request).await?;
        codec::decode_ack(&body)
    }

    /// Submit up to 50 played tracks to the signed-in user's profile.
    /// Requires authentication.
    ///
    /// A track should only be scrobbled once it is longer than 30 seconds
    /// and has played for half its duration or four minutes, whichever comes
    /// first; that judgement is the caller's.
    pub async fn scrobble(
        &self,
        tracks: &[ScrobbleTrack],
    ) -> Result<ScrobbleResult, LastFmError> {
        if tracks.is_empty() {
            return Err(LastFmError::invalid_parameter(
                "tracks",
                "at least one track is required",
            ));
        }
        if tracks.len() > MAX_SCROBBLE_BATCH {
            return Err(LastFmError::invalid_parameter(
                "tracks",
                &format!(
                    "at most {} tracks may be scrobbled per call",
                    MAX_SCROBBLE_BATCH
                ),
            ));
        }

        let mut request = ApiRequest::new("track.scrobble").authenticated();
        for (i, entry) in tracks.iter().enumerate() {
            require_non_empty("track", &entry.track)?;
            require_non_empty("artist", &entry.artist)?;

            request = request
                .param(&format!("track[{}]", i), entry.track.clone())
                .param(&format!("artist[{}]", i), entry.artist.clone())
                .param(
                    &format!("timestamp[{}]", i),
                    entry.timestamp.timestamp().to_string(),
                )
                .param(
                    &format!("chosenByUser[{}]", i),
                    if entry.chosen_by_user { "1" } else { "0" },
                )
                .optional_param(&format!("album[{}]", i), entry.album.clone())
                .optional_param(&format!("albumArtist[{}]", i), entry.album_artist.clone())
                .optional_param(
                    &format!("trackNumber[{}]", i),
                    entry.track_number.map(|n| n.to_string()),
                )
                .optional_param(
                    &format!("duration[{}]", i),
                    entry.duration.map(|d| d.to_string()),
                )
                .optional_param(&format!("mbid[{}]", i), entry.mbid.clone());
        }

        let body = self.client.execute(request).await?;
        codec::decode_scrobbles(&body)
    }
}
