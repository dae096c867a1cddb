//! The async call-site trait.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::RequestDescriptor;
use crate::response::TransportResponse;

/// An outbound HTTP call site.
///
/// Applications depend on this trait rather than a concrete client, so an
/// interceptor wrapping the real transport is indistinguishable from the
/// transport itself.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one call described by `request`.
    async fn execute(&self, request: RequestDescriptor)
    -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        (**self).execute(request).await
    }
}
