//! Request/response kernel for the web service.
//!
//! Everything in this module is service-agnostic plumbing with no knowledge
//! of individual entity methods:
//!
//! - `signer`: deterministic parameter canonicalization and `api_sig`
//!   computation, the part the service rejects byte-inexact.
//! - `request`: the `ApiRequest` builder plus the fixed method→verb and
//!   method→signature policy tables.
//! - `rest`: the `Transport` seam, its reqwest implementation and the
//!   cancellable `RequestHandle`.
//! - `codec`: decoding of the service's heterogeneous JSON shapes into typed
//!   entities, lists and paginated results, with unified error
//!   classification.
//!
//! Signing, building and decoding are synchronous pure-CPU steps; the only
//! suspension point is the `Transport` boundary.
pub mod codec;
pub mod request;
pub mod rest;
pub mod signer;

// Re-export key types for convenience
pub use request::{ApiRequest, HttpVerb};
pub use rest::{HttpTransport, HttpTransportConfig, RequestHandle, Transport, WireRequest};
pub use signer::{auth_token, MethodSigner, SIGNATURE_PARAM};
