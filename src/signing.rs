//! Per-request authentication helpers.
//!
//! Canonical query-string signing: every key and value is URL-encoded
//! (RFC 3986 unreserved characters kept as is), pairs are sorted by encoded
//! key then value, joined with `=` and `&`, and the result is signed with
//! HMAC-SHA1 keyed by `"{secret}&"` and base64-encoded.

use crate::cloud::traits::{CloudCredentials, CloudError, CloudResult, ErrorKind};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "Signature";

/// Encode, sort and join query parameters.
pub fn canonical_query<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k.as_ref()).into_owned(),
                urlencoding::encode(v.as_ref()).into_owned(),
            )
        })
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs query strings with the secret of one set of credentials.
pub struct QuerySigner<'a> {
    credentials: &'a dyn CloudCredentials,
}

impl<'a> QuerySigner<'a> {
    pub fn new(credentials: &'a dyn CloudCredentials) -> Self {
        Self { credentials }
    }

    /// Base64 HMAC-SHA1 of the canonical query.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the MAC cannot be keyed.
    pub fn sign<K, V>(&self, params: &[(K, V)]) -> CloudResult<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = format!("{}&", self.credentials.secret());
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|_| CloudError::new(ErrorKind::InternalError, "Cannot key HMAC-SHA1"))?;
        mac.update(canonical_query(params).as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// The canonical query with its signature appended.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the parameters already carry a signature.
    pub fn signed_query<K, V>(&self, params: &[(K, V)]) -> CloudResult<String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if params.iter().any(|(k, _)| k.as_ref() == SIGNATURE_PARAM) {
            return Err(CloudError::new(
                ErrorKind::InvalidInput,
                "Parameters are already signed",
            ));
        }
        let signature = self.sign(params)?;
        Ok(format!(
            "{}&{SIGNATURE_PARAM}={}",
            canonical_query(params),
            urlencoding::encode(&signature)
        ))
    }
}

/// `Authorization` header value for HTTP basic authentication.
#[must_use]
pub fn basic_auth_header(credentials: &dyn CloudCredentials) -> String {
    let pair = format!("{}:{}", credentials.identifier(), credentials.secret());
    format!("Basic {}", STANDARD.encode(pair))
}
