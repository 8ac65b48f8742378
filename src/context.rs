//! Shared client context and domain objects bound to it.
//!
//! Listers return raw transport DTOs wrapped in [`Bound`], which keeps a
//! reference to the [`ClientContext`] the DTO was fetched with. Follow-up
//! calls made from a bound object reuse the same provider, endpoint and
//! credentials without the caller threading them around.

use crate::cloud::traits::{CloudCredentials, CloudResult};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Provider identity and credentials shared by every object of one client.
pub struct ClientContext {
    provider: String,
    endpoint: String,
    credentials: Arc<dyn CloudCredentials>,
}

impl ClientContext {
    /// Create a context after validating the credentials.
    ///
    /// # Errors
    ///
    /// Returns the credential validation error, if any.
    pub fn new(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        credentials: Arc<dyn CloudCredentials>,
    ) -> CloudResult<Arc<Self>> {
        credentials.validate()?;
        Ok(Arc::new(Self {
            provider: provider.into(),
            endpoint: endpoint.into(),
            credentials,
        }))
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn credentials(&self) -> &dyn CloudCredentials {
        self.credentials.as_ref()
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("identity", &self.credentials.identifier())
            .finish_non_exhaustive()
    }
}

/// A transport DTO bound to the client context it was fetched with.
#[derive(Debug, Clone)]
pub struct Bound<T> {
    inner: T,
    context: Arc<ClientContext>,
}

impl<T> Bound<T> {
    pub fn new(context: Arc<ClientContext>, inner: T) -> Self {
        Self { inner, context }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ClientContext> {
        &self.context
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for Bound<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Bind every DTO of a collection to the same context, preserving order.
pub fn bind_all<T>(context: &Arc<ClientContext>, items: Vec<T>) -> Vec<Bound<T>> {
    items
        .into_iter()
        .map(|item| Bound::new(Arc::clone(context), item))
        .collect()
}
