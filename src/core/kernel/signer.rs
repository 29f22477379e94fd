use md5::{Digest, Md5};
use secrecy::{ExposeSecret, Secret};
use std::collections::BTreeMap;

/// Parameter names that never take part in signature computation.
///
/// `format` selects the serialization of the response and is excluded by the
/// service's signing rule; `api_sig` is the signature itself.
const UNSIGNED_PARAMS: [&str; 2] = ["format", "api_sig"];

/// Name of the query parameter carrying the computed signature.
pub const SIGNATURE_PARAM: &str = "api_sig";

/// Computes `api_sig` values for privileged requests.
///
/// The service rejects any request whose signature was not computed byte-exactly
/// over the final parameter set, so this type is the single place signatures are
/// produced. The rule: sort parameter names by raw byte value, concatenate each
/// name immediately followed by its value with no separators, append the shared
/// secret, MD5, lowercase hex.
pub struct MethodSigner {
    secret: Secret<String>,
}

impl MethodSigner {
    pub fn new(secret: String) -> Self {
        Self {
            secret: Secret::new(secret),
        }
    }

    /// Compute the signature over the exact parameter set that will be sent.
    ///
    /// Any `format` or pre-existing `api_sig` entry is ignored. The `BTreeMap`
    /// keys iterate in raw byte order, which is exactly the ordering the
    /// service's canonicalization mandates (not locale-aware).
    pub fn signature(&self, params: &BTreeMap<String, String>) -> String {
        let mut hasher = Md5::new();
        for (name, value) in params {
            if UNSIGNED_PARAMS.contains(&name.as_str()) {
                continue;
            }
            hasher.update(name.as_bytes());
            hasher.update(value.as_bytes());
        }
        hasher.update(self.secret.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Hash a plaintext password into the credential digest the mobile
/// authentication method expects: `md5(username + md5(password))`.
pub fn auth_token(username: &str, password: &str) -> String {
    let password_hash = hex::encode(Md5::digest(password.as_bytes()));
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(password_hash.as_bytes());
    hex::encode(hasher.finalize())
}
