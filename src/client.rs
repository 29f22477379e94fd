use crate::core::config::ClientConfig;
use crate::core::errors::LastFmError;
use crate::core::kernel::codec;
use crate::core::kernel::request::{http_verb, require_non_empty, requires_signature, ApiRequest};
use crate::core::kernel::rest::{HttpTransport, HttpTransportConfig, Transport, WireRequest};
use crate::core::kernel::signer::{auth_token, MethodSigner, SIGNATURE_PARAM};
use crate::core::session::{FileSessionStore, Session, SessionManager, SessionStore};
use crate::providers::{
    AlbumProvider, ArtistProvider, ChartProvider, GeoProvider, LibraryProvider, TagProvider,
    TrackProvider, UserProvider,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Service error code reported when the session key has been revoked.
const INVALID_SESSION_KEY: i32 = 9;

/// Client facade for the web service.
///
/// Owns the transport, the parameter signer and the session manager, and
/// hands out per-namespace providers. Cloning is cheap; clones share the
/// same session state and connection pool.
///
/// ```no_run
/// use lastkit::{Client, ClientConfig};
///
/// # async fn example() -> Result<(), lastkit::LastFmError> {
/// let client = Client::new(ClientConfig::new("api_key".into(), "shared_secret".into()))?;
/// let track = client.track().get_info(Some("Believe"), Some("Cher"), None, true, None).await?;
/// println!("{} listeners", track.listeners.unwrap_or(0));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    transport: Arc<dyn Transport>,
    signer: MethodSigner,
    session: SessionManager,
    api_key: String,
}

impl Client {
    /// Create a client with the default HTTP transport and a file-backed
    /// session store keyed by the API key.
    pub fn new(config: ClientConfig) -> Result<Self, LastFmError> {
        if !config.has_credentials() {
            return Err(LastFmError::invalid_parameter(
                "config",
                "api key and shared secret must both be set",
            ));
        }
        let store = FileSessionStore::for_service(config.api_key())?;
        let transport_config = HttpTransportConfig::new(config.effective_base_url().to_string())
            .with_timeout(config.timeout_seconds)
            .with_user_agent(config.user_agent.clone());
        let transport = Arc::new(HttpTransport::new(transport_config)?);
        Ok(Self::from_parts(config, transport, Box::new(store)))
    }

    /// Assemble a client from explicit transport and session store
    /// implementations. This is the seam used to inject mock transports in
    /// tests and custom secure stores in applications.
    pub fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                signer: MethodSigner::new(config.api_secret().to_string()),
                session: SessionManager::new(store),
                api_key: config.api_key().to_string(),
            }),
        }
    }

    /// The current session, if a user is signed in. Non-blocking snapshot.
    pub fn session(&self) -> Option<Session> {
        self.inner.session.current_session()
    }

    /// Acquire a session for a user with their username (or email) and
    /// plaintext password.
    ///
    /// The password never travels as plaintext: it is folded into the
    /// mobile-auth credential digest before the request is built, and the
    /// whole parameter set is signed. On success the session is persisted to
    /// the store before this call resolves, then published in memory.
    /// Concurrent calls are queued; the persisted entry always reflects one
    /// complete outcome.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, LastFmError> {
        require_non_empty("username", username)?;
        require_non_empty("password", password)?;

        let _gate = self.inner.session.begin_authentication().await;

        let request = ApiRequest::new("auth.getMobileSession")
            .param("username", username)
            .param("authToken", auth_token(username, password));
        let body = self.inner.execute(request).await?;
        let session: Session = codec::decode_entity(&body, "session")?;

        self.inner.session.install(session.clone())?;
        debug!(username = %session.username, "authenticated");
        Ok(session)
    }

    /// Locally sign out: clears the in-memory session and deletes the
    /// persisted entry. Makes no network call; idempotent.
    pub fn sign_out(&self) -> Result<(), LastFmError> {
        self.inner.session.sign_out()
    }

    pub fn album(&self) -> AlbumProvider {
        AlbumProvider::new(self.clone())
    }

    pub fn artist(&self) -> ArtistProvider {
        ArtistProvider::new(self.clone())
    }

    pub fn track(&self) -> TrackProvider {
        TrackProvider::new(self.clone())
    }

    pub fn tag(&self) -> TagProvider {
        TagProvider::new(self.clone())
    }

    pub fn chart(&self) -> ChartProvider {
        ChartProvider::new(self.clone())
    }

    pub fn geo(&self) -> GeoProvider {
        GeoProvider::new(self.clone())
    }

    pub fn library(&self) -> LibraryProvider {
        LibraryProvider::new(self.clone())
    }

    pub fn user(&self) -> UserProvider {
        UserProvider::new(self.clone())
    }

    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<String, LastFmError> {
        self.inner.execute(request).await
    }
}

impl ClientInner {
    /// Finalize and dispatch one API request.
    ///
    /// Merges the fixed parameters, consults the session manager when the
    /// request is flagged as authenticated (failing before any network
    /// traffic when signed out), and attaches exactly one signature for
    /// privileged methods, computed over the exact final parameter set.
    #[instrument(skip(self, request), fields(method = request.method()))]
    async fn execute(&self, request: ApiRequest) -> Result<String, LastFmError> {
        let method = request.method();
        let needs_auth = request.needs_auth();
        let timeout = request.timeout();
        let mut params = request.into_params();

        params.insert("method".to_string(), method.to_string());
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("format".to_string(), "json".to_string());

        if needs_auth {
            let session = self
                .session
                .current_session()
                .ok_or(LastFmError::AuthenticationRequired)?;
            params.insert("sk".to_string(), session.key);
        }

        if requires_signature(method) {
            let signature = self.signer.signature(&params);
            params.insert(SIGNATURE_PARAM.to_string(), signature);
        }

        let mut wire = WireRequest::new(http_verb(method), params);
        if let Some(timeout) = timeout {
            wire = wire.with_timeout(timeout);
        }
        let body = self.transport.execute(&wire).await?;

        // A revoked session key surfaces as a service error on a privileged
        // call. Drop the stale session so subsequent calls fail fast with
        // AuthenticationRequired instead of burning round trips.
        if needs_auth {
            if let Err(
                err @ LastFmError::Service {
                    code: INVALID_SESSION_KEY,
                    ..
                },
            ) = codec::parse_body(&body)
            {
                warn!("session key rejected by the service, signing out");
                if let Err(e) = self.session.sign_out() {
                    warn!("failed to clear revoked session: {}", e);
                }
                return Err(err);
            }
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::MemorySessionStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingTransport {
        seen: Mutex<Vec<WireRequest>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: &WireRequest) -> Result<String, LastFmError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(r#"{"lfm": {"status": "ok"}}"#.to_string())
        }
    }

    fn client_over(transport: Arc<RecordingTransport>) -> Client {
        Client::from_parts(
            ClientConfig::new("key".to_string(), "secret".to_string()),
            transport,
            Box::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn per_call_timeout_override_reaches_the_transport() {
        let transport = Arc::new(RecordingTransport::new());
        let client = client_over(transport.clone());

        client
            .execute(
                ApiRequest::new("track.getInfo")
                    .param("track", "Believe")
                    .param("artist", "Cher")
                    .with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        client
            .execute(ApiRequest::new("chart.getTopArtists"))
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].timeout, Some(Duration::from_secs(5)));
        assert_eq!(seen[1].timeout, None);
    }
}
