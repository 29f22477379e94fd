use async_trait::async_trait;
use lastkit::core::kernel::request::HttpVerb;
use lastkit::{
    Client, ClientConfig, LastFmError, MemorySessionStore, RequestHandle, SessionStore,
    SubscriberStatus, Transport, WireRequest,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport double: serves queued response bodies and records every
/// dispatched request.
struct MockTransport {
    responses: Mutex<VecDeque<Result<String, LastFmError>>>,
    calls: Mutex<Vec<WireRequest>>,
    delay: Option<Duration>,
    completions: AtomicUsize,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            completions: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn enqueue(&self, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
    }

    fn enqueue_error(&self, error: LastFmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    fn calls(&self) -> Vec<WireRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &WireRequest) -> Result<String, LastFmError> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(r#"{"lfm": {"status": "ok"}}"#.to_string()));
        self.completions.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Session store double sharing its state with the test body.
struct SharedStore(Arc<MemorySessionStore>);

impl SessionStore for SharedStore {
    fn get(&self) -> Result<Option<String>, LastFmError> {
        self.0.get()
    }
    fn set(&self, payload: &str) -> Result<(), LastFmError> {
        self.0.set(payload)
    }
    fn delete(&self) -> Result<(), LastFmError> {
        self.0.delete()
    }
}

fn test_config() -> ClientConfig {
    ClientConfig::new("test_api_key".to_string(), "test_shared_secret".to_string())
}

fn test_client(transport: Arc<MockTransport>) -> (Client, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let client = Client::from_parts(
        test_config(),
        transport,
        Box::new(SharedStore(store.clone())),
    );
    (client, store)
}

const SESSION_BODY: &str =
    r#"{"session": {"name": "alice", "key": "sessionkey123", "subscriber": "0"}}"#;

#[tokio::test]
async fn authenticate_signs_in_and_persists_the_session() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(SESSION_BODY);
    let (client, store) = test_client(transport.clone());

    let session = client.authenticate("alice", "pw").await.unwrap();
    assert_eq!(session.username, "alice");
    assert_eq!(session.subscriber, SubscriberStatus::Free);

    // In-memory state reflects the new session.
    let current = client.session().unwrap();
    assert_eq!(current.key, "sessionkey123");

    // The persisted entry is durable and decodable.
    let persisted = store.get().unwrap().unwrap();
    assert!(persisted.contains("sessionkey123"));

    // The auth request was privileged: POST, signed, no plaintext password.
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let request = &calls[0];
    assert_eq!(request.verb, HttpVerb::Post);
    assert_eq!(
        request.params.get("method").unwrap(),
        "auth.getMobileSession"
    );
    assert!(request.params.contains_key("api_sig"));
    assert!(request.params.contains_key("authToken"));
    assert!(!request.params.contains_key("password"));
}

#[tokio::test]
async fn failed_authentication_persists_nothing() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(r#"{"error": 4, "message": "Authentication Failed"}"#);
    let (client, store) = test_client(transport);

    let err = client.authenticate("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, LastFmError::Service { code: 4, .. }));
    assert!(client.session().is_none());
    assert!(store.get().unwrap().is_none());
}

#[tokio::test]
async fn privileged_call_while_signed_out_never_touches_the_network() {
    let transport = Arc::new(MockTransport::new());
    let (client, _store) = test_client(transport.clone());

    let err = client.track().love("Believe", "Cher").await.unwrap_err();
    assert!(matches!(err, LastFmError::AuthenticationRequired));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn privileged_call_carries_session_token_and_signature() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(SESSION_BODY);
    transport.enqueue(r#"{"lfm": {"status": "ok"}}"#);
    let (client, _store) = test_client(transport.clone());

    client.authenticate("alice", "pw").await.unwrap();
    client.track().love("Believe", "Cher").await.unwrap();

    let calls = transport.calls();
    let love = &calls[1];
    assert_eq!(love.verb, HttpVerb::Post);
    assert_eq!(love.params.get("sk").unwrap(), "sessionkey123");
    assert_eq!(love.params.get("format").unwrap(), "json");
    assert!(love.params.contains_key("api_sig"));
}

#[tokio::test]
async fn read_calls_are_plain_get_requests() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(r#"{"track": {"name": "Believe", "duration": "255000"}}"#);
    let (client, _store) = test_client(transport.clone());

    let track = client
        .track()
        .get_info(Some("Believe"), Some("Cher"), None, true, None)
        .await
        .unwrap();
    assert_eq!(track.duration, Some(255_000));

    let request = &transport.calls()[0];
    assert_eq!(request.verb, HttpVerb::Get);
    assert!(!request.params.contains_key("api_sig"));
    assert!(!request.params.contains_key("sk"));
}

#[tokio::test]
async fn embedded_error_envelope_wins_over_http_success() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(r#"{"error": 6, "message": "not found"}"#);
    let (client, _store) = test_client(transport);

    let err = client
        .artist()
        .get_info(Some("Nonexistent"), None, false, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LastFmError::Service { code: 6, ref message } if message == "not found"
    ));
}

#[tokio::test]
async fn paginated_response_round_trips_metadata() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(
        r#"{
            "artists": {
                "artist": [{"name": "a"}, {"name": "b"}, {"name": "c"}],
                "@attr": {"page": "2", "perPage": "10", "totalPages": "3", "total": "25"}
            }
        }"#,
    );
    let (client, _store) = test_client(transport);

    let result = client
        .chart()
        .get_top_artists(Some(2), Some(10))
        .await
        .unwrap();
    assert!(result.items.len() <= result.page.per_page as usize);
    assert_eq!(result.page.page, 2);
    assert_eq!(result.page.total_pages, 3);
    assert_eq!(result.page.total, 25);
}

#[tokio::test]
async fn missing_pagination_attributes_default_to_a_single_page() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(
        r#"{"artists": {"artist": [
            {"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "d"}, {"name": "e"}
        ]}}"#,
    );
    let (client, _store) = test_client(transport);

    let result = client.chart().get_top_artists(None, None).await.unwrap();
    assert_eq!(result.items.len(), 5);
    assert_eq!(result.page.page, 1);
    assert_eq!(result.page.total_pages, 1);
    assert_eq!(result.page.per_page, 5);
    assert_eq!(result.page.total, 5);
}

#[tokio::test]
async fn out_of_range_pagination_fails_before_dispatch() {
    let transport = Arc::new(MockTransport::new());
    let (client, _store) = test_client(transport.clone());

    let err = client
        .chart()
        .get_top_artists(Some(0), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LastFmError::InvalidParameter { .. }));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn oversized_scrobble_batch_is_rejected_locally() {
    let transport = Arc::new(MockTransport::new());
    let (client, _store) = test_client(transport.clone());

    let tracks: Vec<_> = (0..51)
        .map(|i| {
            lastkit::ScrobbleTrack::new(
                format!("Track {}", i),
                "Artist".to_string(),
                chrono::Utc::now(),
            )
        })
        .collect();

    let err = client.track().scrobble(&tracks).await.unwrap_err();
    assert!(matches!(
        err,
        LastFmError::InvalidParameter { ref name, .. } if name == "tracks"
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn scrobble_batch_is_indexed_and_summarized() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(SESSION_BODY);
    transport.enqueue(r#"{"scrobbles": {"@attr": {"accepted": 2, "ignored": 0}}}"#);
    let (client, _store) = test_client(transport.clone());

    client.authenticate("alice", "pw").await.unwrap();

    let tracks = vec![
        lastkit::ScrobbleTrack::new("One".to_string(), "Artist".to_string(), chrono::Utc::now()),
        lastkit::ScrobbleTrack::new("Two".to_string(), "Artist".to_string(), chrono::Utc::now()),
    ];
    let result = client.track().scrobble(&tracks).await.unwrap();
    assert_eq!(result.accepted, 2);
    assert_eq!(result.ignored, 0);

    let request = &transport.calls()[1];
    assert_eq!(request.params.get("track[0]").unwrap(), "One");
    assert_eq!(request.params.get("track[1]").unwrap(), "Two");
    assert!(request.params.contains_key("timestamp[0]"));
    assert!(request.params.contains_key("api_sig"));
}

#[tokio::test]
async fn sign_out_is_idempotent_and_clears_storage() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(SESSION_BODY);
    let (client, store) = test_client(transport);

    client.authenticate("alice", "pw").await.unwrap();
    assert!(store.get().unwrap().is_some());

    client.sign_out().unwrap();
    assert!(client.session().is_none());
    assert!(store.get().unwrap().is_none());

    client.sign_out().unwrap();
    assert!(client.session().is_none());
}

#[tokio::test]
async fn concurrent_authentication_persists_exactly_one_outcome() {
    let transport = Arc::new(
        MockTransport::new().with_delay(Duration::from_millis(10)),
    );
    transport
        .enqueue(r#"{"session": {"name": "alice", "key": "key_a", "subscriber": "0"}}"#);
    transport.enqueue(r#"{"session": {"name": "bob", "key": "key_b", "subscriber": "1"}}"#);
    let (client, store) = test_client(transport);

    let first = client.authenticate("alice", "pw_a");
    let second = client.authenticate("bob", "pw_b");
    let (first, second) = futures::join!(first, second);
    first.unwrap();
    second.unwrap();

    // The attempts were queued, not interleaved: whatever won, the persisted
    // entry is one complete session, never a merge of the two.
    let persisted: lastkit::Session =
        serde_json::from_str(&store.get().unwrap().unwrap()).unwrap();
    let consistent = (persisted.username == "alice" && persisted.key == "key_a")
        || (persisted.username == "bob" && persisted.key == "key_b");
    assert!(consistent, "persisted a merged session: {:?}", persisted);

    let current = client.session().unwrap();
    assert_eq!(current.username, persisted.username);
    assert_eq!(current.key, persisted.key);
}

#[tokio::test]
async fn cancelled_operation_never_completes() {
    let transport = Arc::new(MockTransport::new().with_delay(Duration::from_secs(30)));
    let (client, _store) = test_client(transport.clone());

    let chart = client.chart();
    let handle = RequestHandle::spawn(async move { chart.get_top_artists(None, None).await });

    // Let the request reach the transport, then cancel before it responds.
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(transport.calls().len(), 1);
    assert_eq!(transport.completions(), 0);
}

#[tokio::test]
async fn revoked_session_key_signs_the_client_out() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(SESSION_BODY);
    transport.enqueue(r#"{"error": 9, "message": "Invalid session key - Please re-authenticate"}"#);
    let (client, store) = test_client(transport.clone());

    client.authenticate("alice", "pw").await.unwrap();
    let err = client.track().love("Believe", "Cher").await.unwrap_err();
    assert!(matches!(err, LastFmError::Service { code: 9, .. }));

    // The stale session is gone; the next privileged call fails locally.
    assert!(client.session().is_none());
    assert!(store.get().unwrap().is_none());
    let err = client.track().love("Believe", "Cher").await.unwrap_err();
    assert!(matches!(err, LastFmError::AuthenticationRequired));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn transport_errors_propagate_unchanged() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_error(LastFmError::Network("request timed out".to_string()));
    let (client, _store) = test_client(transport);

    let err = client.chart().get_top_tags(None, None).await.unwrap_err();
    assert!(matches!(err, LastFmError::Network(_)));
}

#[tokio::test]
async fn session_restores_from_storage_without_a_network_call() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(MemorySessionStore::new());
    store
        .set(r#"{"name": "alice", "key": "restored_key", "subscriber": "free"}"#)
        .unwrap();

    let client = Client::from_parts(
        test_config(),
        transport.clone(),
        Box::new(SharedStore(store)),
    );

    let session = client.session().unwrap();
    assert_eq!(session.username, "alice");
    assert_eq!(session.key, "restored_key");
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn personal_tags_round_trip_with_declared_kind() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue(
        r#"{
            "taggings": {
                "artists": {"artist": [{"name": "Cher"}]},
                "@attr": {"page": "1", "perPage": "50", "totalPages": "1", "total": "1"}
            }
        }"#,
    );
    let (client, _store) = test_client(transport);

    let (items, page) = client
        .user()
        .get_personal_tags("alice", "pop", lastkit::TaggingType::Artist, None, None)
        .await
        .unwrap();
    assert!(matches!(items, lastkit::TaggedItems::Artists(ref a) if a.len() == 1));
    assert_eq!(page.total, 1);
}
