//! The transport seam between methods and a physical device connection.

use crate::TransportError;
use async_trait::async_trait;
use connect_protocol::EncodedMessage;

/// Performs one request/response exchange with a device.
///
/// Implementations own liveness: timeouts, reconnects and session handling all happen below this
/// trait. A call never pipelines; the next request is only sent after the previous response was
/// received.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: Send {
    async fn call(&mut self, message: EncodedMessage) -> Result<EncodedMessage, TransportError>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn call(&mut self, message: EncodedMessage) -> Result<EncodedMessage, TransportError> {
        (**self).call(message).await
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn call(&mut self, message: EncodedMessage) -> Result<EncodedMessage, TransportError> {
        (**self).call(message).await
    }
}
