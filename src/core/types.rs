use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Pagination metadata attached to every paginated result.
///
/// `page` starts at 1. `page` may exceed `total_pages` when the service
/// returns an empty trailing page; that is tolerated, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub total_pages: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Page {
    /// Metadata for a response that carried no pagination attributes: a
    /// single page holding everything that was returned. Keeps downstream
    /// pagination logic total.
    pub fn single(len: usize) -> Self {
        Self {
            page: 1,
            total_pages: 1,
            per_page: len as u32,
            total: len as u64,
        }
    }
}

/// A decoded homogeneous list plus its position in the larger result set.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: Page,
}

/// The kind of entity a tagging call refers to. The service's tagged-item
/// payloads are shape-identical across kinds; this tag carries the caller's
/// intent through to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggingType {
    Artist,
    Album,
    Track,
}

impl TaggingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }
}

/// Items tagged by a user, homogeneous per the requested [`TaggingType`].
#[derive(Debug, Clone)]
pub enum TaggedItems {
    Artists(Vec<Artist>),
    Albums(Vec<Album>),
    Tracks(Vec<Track>),
}

/// Time window for a user's top-entity charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Overall,
    SevenDay,
    OneMonth,
    ThreeMonth,
    SixMonth,
    TwelveMonth,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::SevenDay => "7day",
            Self::OneMonth => "1month",
            Self::ThreeMonth => "3month",
            Self::SixMonth => "6month",
            Self::TwelveMonth => "12month",
        }
    }
}

/// One rendition of an entity's artwork.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(rename = "#text", default)]
    pub url: String,
}

/// Editorial text attached to an entity.
#[derive(Debug, Clone, Deserialize)]
pub struct Wiki {
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Listener/playcount statistics, nested under `stats` on info responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub playcount: Option<u64>,
    #[serde(default, rename = "userplaycount", deserialize_with = "de::opt_u64")]
    pub user_playcount: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "image")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub stats: Option<Stats>,
    // Flat variants of the stats fields, present on list-shaped payloads.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub playcount: Option<u64>,
    #[serde(default, rename = "match", deserialize_with = "de::opt_f64")]
    pub similarity: Option<f64>,
    #[serde(default, rename = "bio")]
    pub wiki: Option<Wiki>,
}

/// Artist reference on a track or album. Search payloads carry a bare name
/// string where info payloads carry a full object; both decode here.
#[derive(Debug, Clone)]
pub struct ArtistRef {
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
}

impl<'de> Deserialize<'de> for ArtistRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Full {
                name: String,
                #[serde(default, deserialize_with = "de::opt_string")]
                mbid: Option<String>,
                #[serde(default)]
                url: Option<String>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Name(name) => Self {
                name,
                mbid: None,
                url: None,
            },
            Repr::Full { name, mbid, url } => Self { name, mbid, url },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    #[serde(alias = "title", alias = "#text")]
    pub name: String,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "image")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub playcount: Option<u64>,
    /// Position of a track's album within that album, from `@attr.position`.
    #[serde(default, rename = "@attr")]
    pub attr: Option<AlbumAttr>,
    #[serde(default)]
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumAttr {
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub position: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Track length. Info payloads serialize milliseconds as a string;
    /// absent or empty means unknown, never zero.
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default, rename = "image")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub listeners: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub playcount: Option<u64>,
    #[serde(default, rename = "userplaycount", deserialize_with = "de::opt_u64")]
    pub user_playcount: Option<u64>,
    #[serde(default, rename = "userloved", deserialize_with = "de::opt_bool")]
    pub user_loved: Option<bool>,
    #[serde(default, rename = "match", deserialize_with = "de::opt_f64")]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub reach: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub total: Option<u64>,
    #[serde(default)]
    pub wiki: Option<Wiki>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, rename = "realname", deserialize_with = "de::opt_string")]
    pub real_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub age: Option<u64>,
    #[serde(default, rename = "image")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub playcount: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub subscriber: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_registered")]
    pub registered: Option<u64>,
}

/// One entry in a user's weekly chart list: an inclusive date range keyed by
/// epoch seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    #[serde(deserialize_with = "de::u64_flexible")]
    pub from: u64,
    #[serde(deserialize_with = "de::u64_flexible")]
    pub to: u64,
}

/// A played track awaiting submission to the scrobbling API.
#[derive(Debug, Clone)]
pub struct ScrobbleTrack {
    pub track: String,
    pub artist: String,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    /// Length of the track in seconds.
    pub duration: Option<u32>,
    pub mbid: Option<String>,
    /// When the track started playing.
    pub timestamp: DateTime<Utc>,
    /// False when the play was chosen by something other than the user, such
    /// as a radio stream or recommendation service.
    pub chosen_by_user: bool,
}

impl ScrobbleTrack {
    pub fn new(track: String, artist: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            track,
            artist,
            album: None,
            album_artist: None,
            track_number: None,
            duration: None,
            mbid: None,
            timestamp,
            chosen_by_user: true,
        }
    }
}

/// Outcome of a scrobble batch as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrobbleResult {
    pub accepted: u32,
    pub ignored: u32,
}

/// Field coercion helpers for the service's loosely-typed JSON: numbers and
/// booleans arrive as strings, and absent optionals arrive as empty strings.
pub(crate) mod de {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        U64(u64),
        I64(i64),
        F64(f64),
        Bool(bool),
        Str(String),
    }

    /// Optional integer serialized as a number or numeric string. Empty
    /// strings decode to `None`; malformed strings are a hard error so a
    /// bad payload surfaces as a decoding failure instead of a silent zero.
    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::U64(n)) => Ok(Some(n)),
            Some(Scalar::I64(n)) => u64::try_from(n)
                .map(Some)
                .map_err(|_| DeError::custom(format!("negative value {} for unsigned field", n))),
            // The wire never carries fractional counts; a non-integral value
            // is a malformed payload, not something to truncate.
            Some(Scalar::F64(f)) if f.fract() == 0.0 && f >= 0.0 => Ok(Some(f as u64)),
            Some(Scalar::F64(f)) => Err(DeError::custom(format!(
                "non-integral value {} for integer field",
                f
            ))),
            Some(Scalar::Bool(_)) => Err(DeError::custom("expected a number, found a boolean")),
            Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Str(s)) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| DeError::custom(format!("invalid numeric string `{}`", s))),
        }
    }

    /// Required integer serialized as a number or numeric string.
    pub fn u64_flexible<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_u64(deserializer)?
            .ok_or_else(|| DeError::custom("missing or empty required numeric field"))
    }

    /// Optional float, used for similarity match scores.
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::F64(f)) => Ok(Some(f)),
            Some(Scalar::U64(n)) => Ok(Some(n as f64)),
            Some(Scalar::I64(n)) => Ok(Some(n as f64)),
            Some(Scalar::Bool(_)) => Err(DeError::custom("expected a number, found a boolean")),
            Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Str(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| DeError::custom(format!("invalid numeric string `{}`", s))),
        }
    }

    /// Optional flag serialized as `0`/`1`, a numeric 0/1 or a JSON bool.
    pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Scalar::Bool(b)) => Ok(Some(b)),
            Some(Scalar::U64(0) | Scalar::I64(0)) => Ok(Some(false)),
            Some(Scalar::U64(1) | Scalar::I64(1)) => Ok(Some(true)),
            Some(Scalar::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Scalar::Str(s)) => match s.trim() {
                "0" => Ok(Some(false)),
                "1" => Ok(Some(true)),
                other => Err(DeError::custom(format!("invalid flag value `{}`", other))),
            },
            Some(_) => Err(DeError::custom("invalid flag value")),
        }
    }

    /// Optional string where the service sends `""` for "not present".
    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }

    /// Registration date: `{"unixtime": "...", "#text": ...}` or a bare value.
    pub fn opt_registered<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Nested {
                #[serde(deserialize_with = "super::de::opt_u64")]
                unixtime: Option<u64>,
            },
            Bare(Scalar),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Nested { unixtime }) => Ok(unixtime),
            Some(Repr::Bare(Scalar::U64(n))) => Ok(Some(n)),
            Some(Repr::Bare(Scalar::Str(s))) if s.trim().is_empty() => Ok(None),
            Some(Repr::Bare(Scalar::Str(s))) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| DeError::custom(format!("invalid registration date `{}`", s))),
            Some(Repr::Bare(_)) => Err(DeError::custom("invalid registration date")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_coerce_to_numbers() {
        let track: Track = serde_json::from_value(serde_json::json!({
            "name": "Believe",
            "duration": "255000",
            "listeners": 1234,
            "playcount": "9876"
        }))
        .unwrap();
        assert_eq!(track.duration, Some(255_000));
        assert_eq!(track.listeners, Some(1234));
        assert_eq!(track.playcount, Some(9876));
    }

    #[test]
    fn empty_optionals_decode_to_none_not_zero() {
        let track: Track = serde_json::from_value(serde_json::json!({
            "name": "Believe",
            "mbid": "",
            "duration": ""
        }))
        .unwrap();
        assert_eq!(track.mbid, None);
        assert_eq!(track.duration, None);
    }

    #[test]
    fn malformed_numeric_string_is_a_hard_error() {
        let result: Result<Track, _> = serde_json::from_value(serde_json::json!({
            "name": "Believe",
            "duration": "four minutes"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn fractional_numeric_value_is_a_hard_error() {
        let result: Result<Track, _> = serde_json::from_value(serde_json::json!({
            "name": "Believe",
            "duration": 2.5
        }));
        assert!(result.is_err());

        let track: Track = serde_json::from_value(serde_json::json!({
            "name": "Believe",
            "duration": 3.0
        }))
        .unwrap();
        assert_eq!(track.duration, Some(3));
    }

    #[test]
    fn artist_ref_accepts_bare_name_and_full_object() {
        let bare: ArtistRef = serde_json::from_value(serde_json::json!("Cher")).unwrap();
        assert_eq!(bare.name, "Cher");
        assert_eq!(bare.mbid, None);

        let full: ArtistRef = serde_json::from_value(serde_json::json!({
            "name": "Cher",
            "mbid": "bfcc6d75-a6a5-4bc6-8282-47aec8531818",
            "url": "https://www.last.fm/music/Cher"
        }))
        .unwrap();
        assert_eq!(full.mbid.as_deref(), Some("bfcc6d75-a6a5-4bc6-8282-47aec8531818"));
    }

    #[test]
    fn user_registration_decodes_from_nested_object() {
        let user: User = serde_json::from_value(serde_json::json!({
            "name": "alice",
            "realname": "",
            "subscriber": "1",
            "registered": {"unixtime": "1120497600", "#text": 1_120_497_600}
        }))
        .unwrap();
        assert_eq!(user.real_name, None);
        assert_eq!(user.subscriber, Some(true));
        assert_eq!(user.registered, Some(1_120_497_600));
    }

    #[test]
    fn single_page_metadata_is_total() {
        let page = Page::single(5);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.per_page, 5);
        assert_eq!(page.total, 5);
    }
}
