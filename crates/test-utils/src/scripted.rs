use async_trait::async_trait;
use connect_common::{Transport, TransportError};
use connect_protocol::{EncodedMessage, ProtocolMessage};
use std::collections::VecDeque;

/// A transport that answers with a fixed list of responses and records every request.
///
/// Once the responses run out, calls fail with [`TransportError::Disconnected`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    requests: Vec<EncodedMessage>,
    responses: VecDeque<Result<EncodedMessage, TransportError>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `message` as the next response.
    pub fn respond<M: ProtocolMessage>(mut self, message: M) -> Self {
        self.responses.push_back(Ok(message.to_encoded()));
        self
    }

    /// Queues an error as the next response.
    pub fn fail(mut self, err: TransportError) -> Self {
        self.responses.push_back(Err(err));
        self
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> &[EncodedMessage] {
        &self.requests
    }

    /// Number of responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&mut self, message: EncodedMessage) -> Result<EncodedMessage, TransportError> {
        trace!(%message, "scripted request");
        self.requests.push(message);
        self.responses.pop_front().unwrap_or(Err(TransportError::Disconnected))
    }
}
