use crate::core::errors::LastFmError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Pagination bounds accepted by the service.
pub const MIN_PAGE: u32 = 1;
pub const MAX_PAGE: u32 = 10_000;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 10_000;

/// Default page size applied when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 30;

/// HTTP verb chosen for a method by the fixed routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
}

/// Methods that mutate remote state or prove identity. These are sent as POST
/// and carry an `api_sig` computed over the final parameter set.
///
/// This is the service's documented per-method policy, enumerated rather than
/// inferred from parameter shapes.
const WRITE_METHODS: [&str; 11] = [
    "auth.getMobileSession",
    "album.addTags",
    "album.removeTag",
    "artist.addTags",
    "artist.removeTag",
    "track.addTags",
    "track.removeTag",
    "track.love",
    "track.unlove",
    "track.scrobble",
    "track.updateNowPlaying",
];

/// Look up the HTTP verb for an API method.
pub fn http_verb(method: &str) -> HttpVerb {
    if WRITE_METHODS.contains(&method) {
        HttpVerb::Post
    } else {
        HttpVerb::Get
    }
}

/// Whether a method must carry a computed signature.
///
/// Exactly the write methods are privileged; read methods authenticate with
/// the API key alone.
pub fn requires_signature(method: &str) -> bool {
    WRITE_METHODS.contains(&method)
}

/// A single API call before transport finalization: the method name, the
/// caller-supplied parameters and whether a session token is required.
///
/// Fixed parameters (`api_key`, `format`, `method`, `sk`, `api_sig`) are merged
/// in by the client when the request is dispatched, so a builder never carries
/// credentials.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: &'static str,
    params: BTreeMap<String, String>,
    needs_auth: bool,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            params: BTreeMap::new(),
            needs_auth: false,
            timeout: None,
        }
    }

    /// Mark this request as requiring a signed-in session.
    pub fn authenticated(mut self) -> Self {
        self.needs_auth = true;
        self
    }

    /// Override the transport's default timeout for this call only.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a required parameter.
    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Add a parameter only when a value is present. Absent optionals are
    /// omitted from the wire entirely rather than sent empty.
    pub fn optional_param(mut self, name: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.params.insert(name.to_string(), value.into());
        }
        self
    }

    /// Add a boolean flag parameter serialized as `0`/`1`.
    pub fn flag_param(mut self, name: &str, value: bool) -> Self {
        self.params
            .insert(name.to_string(), if value { "1" } else { "0" }.to_string());
        self
    }

    /// Add validated pagination parameters, applying the documented defaults
    /// (page 1, 30 items per page) when the caller passes `None`.
    pub fn pagination(
        mut self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, LastFmError> {
        let page = page.unwrap_or(MIN_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if !(MIN_PAGE..=MAX_PAGE).contains(&page) {
            return Err(LastFmError::invalid_parameter(
                "page",
                &format!("must be between {} and {}", MIN_PAGE, MAX_PAGE),
            ));
        }
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(LastFmError::invalid_parameter(
                "limit",
                &format!("must be between {} and {}", MIN_LIMIT, MAX_LIMIT),
            ));
        }

        self.params.insert("page".to_string(), page.to_string());
        self.params.insert("limit".to_string(), limit.to_string());
        Ok(self)
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn needs_auth(&self) -> bool {
        self.needs_auth
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub(crate) fn into_params(self) -> BTreeMap<String, String> {
        self.params
    }
}

/// Reject empty required identifiers before any network traffic.
pub fn require_non_empty(name: &str, value: &str) -> Result<(), LastFmError> {
    if value.trim().is_empty() {
        return Err(LastFmError::invalid_parameter(name, "must not be empty"));
    }
    Ok(())
}

/// Entity lookups accept either a name-based identifier pair or a
/// MusicBrainzID; at least one form must be supplied.
pub fn require_name_or_mbid(
    name: Option<&str>,
    name_param: &str,
    mbid: Option<&str>,
) -> Result<(), LastFmError> {
    match (name, mbid) {
        (None, None) => Err(LastFmError::invalid_parameter(
            name_param,
            "either a name or a MusicBrainzID must be supplied",
        )),
        (Some(value), _) => require_non_empty(name_param, value),
        (None, Some(mbid)) => require_non_empty("mbid", mbid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_methods_route_to_post_and_are_signed() {
        for method in [
            "track.scrobble",
            "track.updateNowPlaying",
            "track.love",
            "auth.getMobileSession",
            "album.addTags",
        ] {
            assert_eq!(http_verb(method), HttpVerb::Post, "{method}");
            assert!(requires_signature(method), "{method}");
        }
    }

    #[test]
    fn read_methods_route_to_get_unsigned() {
        for method in ["track.getInfo", "album.search", "chart.getTopArtists"] {
            assert_eq!(http_verb(method), HttpVerb::Get, "{method}");
            assert!(!requires_signature(method), "{method}");
        }
    }

    #[test]
    fn pagination_defaults_apply() {
        let request = ApiRequest::new("artist.search")
            .pagination(None, None)
            .unwrap();
        assert_eq!(request.params().get("page").unwrap(), "1");
        assert_eq!(request.params().get("limit").unwrap(), "30");
    }

    #[test]
    fn pagination_out_of_bounds_is_rejected_locally() {
        let err = ApiRequest::new("artist.search")
            .pagination(Some(0), None)
            .unwrap_err();
        assert!(matches!(
            err,
            LastFmError::InvalidParameter { ref name, .. } if name == "page"
        ));

        let err = ApiRequest::new("artist.search")
            .pagination(None, Some(10_001))
            .unwrap_err();
        assert!(matches!(
            err,
            LastFmError::InvalidParameter { ref name, .. } if name == "limit"
        ));
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let request = ApiRequest::new("track.getInfo")
            .param("track", "Believe")
            .optional_param("mbid", None::<String>)
            .flag_param("autocorrect", true);
        assert!(!request.params().contains_key("mbid"));
        assert_eq!(request.params().get("autocorrect").unwrap(), "1");
    }

    #[test]
    fn empty_identifiers_fail_fast() {
        assert!(require_non_empty("artist", "  ").is_err());
        assert!(require_non_empty("artist", "Cher").is_ok());
        assert!(require_name_or_mbid(None, "track", None).is_err());
        assert!(require_name_or_mbid(None, "track", Some("mbid-123")).is_ok());
        assert!(require_name_or_mbid(Some("Believe"), "track", None).is_ok());
    }
}
