//! Remote process sink and host resolver: the outbound half of the
//! endpoint layer, wiring [`EndpointManager`](super::manager::EndpointManager)
//! into [`ProcessRegistry`] so remote PIDs route like local ones.

// Layer 1: Standard library
use std::marker::PhantomData;
use std::sync::Arc;

// Layer 2: Third-party
use async_trait::async_trait;
use serde::Serialize;

// Layer 3: Internal
use super::manager::EndpointManager;
use crate::broker::{BrokerError, HostResolver, ProcessSink};
use crate::message::{Envelope, Message, SystemMessage};
use crate::util::{MemberId, Pid, CLIENT_ADDRESS_PREFIX};

/// A [`ProcessSink`] that serializes envelopes and hands them to an
/// [`Endpoint`](super::endpoint::Endpoint) for transmission.
pub struct RemoteProcessSink<M: Message> {
    pid: Pid,
    endpoint: Arc<super::endpoint::Endpoint>,
    _marker: PhantomData<M>,
}

impl<M: Message> RemoteProcessSink<M> {
    pub fn new(pid: Pid, endpoint: Arc<super::endpoint::Endpoint>) -> Self {
        Self {
            pid,
            endpoint,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<M> ProcessSink<M> for RemoteProcessSink<M>
where
    M: Message + Serialize,
{
    async fn send(&self, envelope: Envelope<M>) -> Result<(), BrokerError> {
        let target = envelope.target.clone();
        let frame = serde_json::to_vec(&envelope)
            .map_err(|err| BrokerError::RemoteSendFailed(target.clone(), err.to_string()))?;
        self.endpoint
            .send(frame)
            .map_err(|err| BrokerError::RemoteSendFailed(target, err.to_string()))
    }

    fn pid(&self) -> Pid {
        self.pid.clone()
    }

    /// System messages never cross the wire: lifecycle is local to each
    /// process, not shared between a PID's local half and its remote peer.
    fn push_system(&self, _message: SystemMessage) {}
}

/// Resolves non-local PIDs to a [`RemoteProcessSink`] backed by whatever
/// endpoint the manager already holds (or freshly dials).
pub struct RemoteHostResolver<M: Message> {
    manager: Arc<EndpointManager>,
    _marker: PhantomData<M>,
}

impl<M: Message> RemoteHostResolver<M> {
    pub fn new(manager: Arc<EndpointManager>) -> Self {
        Self {
            manager,
            _marker: PhantomData,
        }
    }
}

impl<M> HostResolver<M> for RemoteHostResolver<M>
where
    M: Message + Serialize,
{
    fn resolve(&self, pid: &Pid) -> Option<Arc<dyn ProcessSink<M>>> {
        let endpoint = if pid.address().is_client() {
            let member = MemberId(
                pid.address()
                    .as_str()
                    .trim_start_matches(CLIENT_ADDRESS_PREFIX)
                    .to_string(),
            );
            self.manager.get_or_add_client(&member)
        } else {
            self.manager.get_or_add_server(pid.address())
        };

        Some(Arc::new(RemoteProcessSink::new(pid.clone(), endpoint)) as Arc<dyn ProcessSink<M>>)
    }
}
