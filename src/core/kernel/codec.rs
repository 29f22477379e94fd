use crate::core::errors::LastFmError;
use crate::core::types::{de, Page, Paginated, ScrobbleResult, TaggedItems, TaggingType};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Parse the raw body and check the service error envelope.
///
/// The service may return `{"error": <code>, "message": <text>}` with any
/// HTTP status, including 200, so this check runs on every response before
/// structural decoding is attempted.
pub fn parse_body(body: &str) -> Result<Value, LastFmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LastFmError::Decoding(format!("response is not valid JSON: {}", e)))?;
    check_error_envelope(&value)?;
    Ok(value)
}

fn check_error_envelope(value: &Value) -> Result<(), LastFmError> {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(deserialize_with = "de::u64_flexible")]
        error: u64,
        #[serde(default)]
        message: Option<String>,
    }

    if value.get("error").is_some() {
        let envelope: Envelope = serde_json::from_value(value.clone())
            .map_err(|e| LastFmError::Decoding(format!("malformed error envelope: {}", e)))?;
        return Err(LastFmError::Service {
            code: envelope.error as i32,
            message: envelope.message.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    Ok(())
}

/// Decode a single entity nested under a method-specific key.
pub fn decode_entity<T: DeserializeOwned>(body: &str, key: &str) -> Result<T, LastFmError> {
    let value = parse_body(body)?;
    let entity = value
        .get(key)
        .ok_or_else(|| LastFmError::Decoding(format!("missing `{}` object in response", key)))?;
    serde_json::from_value(entity.clone())
        .map_err(|e| LastFmError::Decoding(format!("malformed `{}` object: {}", key, e)))
}

/// Decode a write acknowledgement: no content expected beyond the absence of
/// an error envelope.
pub fn decode_ack(body: &str) -> Result<(), LastFmError> {
    // Some write methods answer with an empty body on success.
    if body.trim().is_empty() {
        return Ok(());
    }
    parse_body(body).map(|_| ())
}

/// Normalize the service's list quirks: a JSON array decodes element-wise, a
/// single bare object decodes as a one-element list, and an absent or null
/// key is an empty list.
fn items_from<T: DeserializeOwned>(value: Option<&Value>, key: &str) -> Result<Vec<T>, LastFmError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.clone())
                    .map_err(|e| LastFmError::Decoding(format!("malformed `{}` item: {}", key, e)))
            })
            .collect(),
        Some(single) => serde_json::from_value(single.clone())
            .map(|item| vec![item])
            .map_err(|e| LastFmError::Decoding(format!("malformed `{}` item: {}", key, e))),
    }
}

/// Decode a homogeneous, non-paginated list nested as `outer.inner`.
pub fn decode_list<T: DeserializeOwned>(
    body: &str,
    outer: &str,
    inner: &str,
) -> Result<Vec<T>, LastFmError> {
    let value = parse_body(body)?;
    let container = value
        .get(outer)
        .ok_or_else(|| LastFmError::Decoding(format!("missing `{}` object in response", outer)))?;
    items_from(container.get(inner), inner)
}

/// Pagination attributes as the service serializes them (all strings).
#[derive(Debug, Default, Deserialize)]
struct PageAttr {
    #[serde(default, deserialize_with = "de::opt_u64")]
    page: Option<u64>,
    #[serde(default, rename = "totalPages", deserialize_with = "de::opt_u64")]
    total_pages: Option<u64>,
    #[serde(default, rename = "perPage", deserialize_with = "de::opt_u64")]
    per_page: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    total: Option<u64>,
}

impl PageAttr {
    /// Build [`Page`] metadata, defaulting any absent attribute so pagination
    /// stays total for downstream callers.
    fn into_page(self, item_count: usize) -> Page {
        let fallback = Page::single(item_count);
        Page {
            page: self.page.map_or(fallback.page, |v| v as u32),
            total_pages: self.total_pages.map_or(fallback.total_pages, |v| v as u32),
            per_page: self.per_page.map_or(fallback.per_page, |v| v as u32),
            total: self.total.unwrap_or(fallback.total),
        }
    }
}

fn page_from_attr(container: &Value, item_count: usize) -> Result<Page, LastFmError> {
    match container.get("@attr") {
        None => Ok(Page::single(item_count)),
        Some(attr) => {
            let attr: PageAttr = serde_json::from_value(attr.clone())
                .map_err(|e| LastFmError::Decoding(format!("malformed `@attr` block: {}", e)))?;
            Ok(attr.into_page(item_count))
        }
    }
}

/// Decode a paginated list nested as `outer.inner` with `outer.@attr`
/// pagination metadata.
pub fn decode_paginated<T: DeserializeOwned>(
    body: &str,
    outer: &str,
    inner: &str,
) -> Result<Paginated<T>, LastFmError> {
    let value = parse_body(body)?;
    let container = value
        .get(outer)
        .ok_or_else(|| LastFmError::Decoding(format!("missing `{}` object in response", outer)))?;
    let items: Vec<T> = items_from(container.get(inner), inner)?;
    let page = page_from_attr(container, items.len())?;
    Ok(Paginated { items, page })
}

/// Decode a search result: items under `results.<collection>.<inner>` with
/// opensearch pagination fields on the `results` object.
pub fn decode_search<T: DeserializeOwned>(
    body: &str,
    collection: &str,
    inner: &str,
) -> Result<Paginated<T>, LastFmError> {
    let value = parse_body(body)?;
    let results = value
        .get("results")
        .ok_or_else(|| LastFmError::Decoding("missing `results` object in response".to_string()))?;
    let items: Vec<T> = items_from(
        results.get(collection).and_then(|c| c.get(inner)),
        inner,
    )?;

    let total = opensearch_u64(results, "opensearch:totalResults");
    let per_page = opensearch_u64(results, "opensearch:itemsPerPage");
    let start_index = opensearch_u64(results, "opensearch:startIndex");

    let fallback = Page::single(items.len());
    let per_page = per_page.map_or(fallback.per_page, |v| v as u32);
    let total = total.unwrap_or(fallback.total);
    let page = match (start_index, per_page) {
        (Some(start), per) if per > 0 => (start as u32 / per) + 1,
        _ => 1,
    };
    let total_pages = if per_page > 0 {
        ((total + u64::from(per_page) - 1) / u64::from(per_page)).max(1) as u32
    } else {
        1
    };

    Ok(Paginated {
        items,
        page: Page {
            page,
            total_pages,
            per_page,
            total,
        },
    })
}

fn opensearch_u64(results: &Value, key: &str) -> Option<u64> {
    match results.get(key) {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    }
}

/// Decode items tagged by a user, filtered by the caller's declared kind.
///
/// The payload shape is identical across kinds, so only the caller's intent
/// disambiguates it: requesting a kind the response does not carry (while it
/// carries another) is caller misuse, reported as `InvalidParameter`.
pub fn decode_taggings(body: &str, kind: TaggingType) -> Result<(TaggedItems, Page), LastFmError> {
    let value = parse_body(body)?;
    let container = value.get("taggings").ok_or_else(|| {
        LastFmError::Decoding("missing `taggings` object in response".to_string())
    })?;

    let (wrapper, inner) = match kind {
        TaggingType::Artist => ("artists", "artist"),
        TaggingType::Album => ("albums", "album"),
        TaggingType::Track => ("tracks", "track"),
    };

    if container.get(wrapper).is_none() {
        let carried = ["artists", "albums", "tracks"]
            .iter()
            .find(|k| container.get(**k).is_some());
        if let Some(carried) = carried {
            return Err(LastFmError::invalid_parameter(
                "taggingtype",
                &format!(
                    "requested `{}` items but the response carries `{}`",
                    kind.as_str(),
                    carried
                ),
            ));
        }
    }

    let collection = container.get(wrapper).and_then(|w| w.get(inner));
    let (items, len) = match kind {
        TaggingType::Artist => {
            let list = items_from(collection, inner)?;
            let len = list.len();
            (TaggedItems::Artists(list), len)
        }
        TaggingType::Album => {
            let list = items_from(collection, inner)?;
            let len = list.len();
            (TaggedItems::Albums(list), len)
        }
        TaggingType::Track => {
            let list = items_from(collection, inner)?;
            let len = list.len();
            (TaggedItems::Tracks(list), len)
        }
    };

    let page = page_from_attr(container, len)?;
    Ok((items, page))
}

/// Decode a spelling-correction response: the canonical entity nested under
/// `corrections.correction.<key>`. `None` when the service proposes no
/// correction.
pub fn decode_correction<T: DeserializeOwned>(
    body: &str,
    key: &str,
) -> Result<Option<T>, LastFmError> {
    let value = parse_body(body)?;
    let Some(corrected) = value
        .get("corrections")
        .and_then(|c| c.get("correction"))
        .and_then(|c| c.get(key))
    else {
        return Ok(None);
    };
    serde_json::from_value(corrected.clone())
        .map(Some)
        .map_err(|e| LastFmError::Decoding(format!("malformed `{}` correction: {}", key, e)))
}

/// Decode a scrobble batch acknowledgement into accepted/ignored counts.
pub fn decode_scrobbles(body: &str) -> Result<ScrobbleResult, LastFmError> {
    #[derive(Deserialize)]
    struct Attr {
        #[serde(default, deserialize_with = "de::opt_u64")]
        accepted: Option<u64>,
        #[serde(default, deserialize_with = "de::opt_u64")]
        ignored: Option<u64>,
    }

    let value = parse_body(body)?;
    let attr = value
        .get("scrobbles")
        .and_then(|s| s.get("@attr"))
        .ok_or_else(|| {
            LastFmError::Decoding("missing `scrobbles.@attr` block in response".to_string())
        })?;
    let attr: Attr = serde_json::from_value(attr.clone())
        .map_err(|e| LastFmError::Decoding(format!("malformed scrobble summary: {}", e)))?;

    Ok(ScrobbleResult {
        accepted: attr.accepted.unwrap_or(0) as u32,
        ignored: attr.ignored.unwrap_or(0) as u32,
    })
}
