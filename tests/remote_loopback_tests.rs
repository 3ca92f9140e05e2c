//! End-to-end tests for the remote endpoint layer over the in-process
//! loopback transport: dialing, frame delivery, and cache-hit lookups.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use strata_rt::event_stream::EventStream;
use strata_rt::message::{Envelope, Message};
use strata_rt::remote::{EndpointManager, LoopbackChannelProvider};
use strata_rt::util::{ActorId, Address, MemberId, Pid};
use strata_rt::ActorSystem;

async fn wait_until(predicate: impl Fn() -> bool) {
    for _ in 0..100 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn frame_sent_through_endpoint_arrives_at_listener() {
    let provider = Arc::new(LoopbackChannelProvider::new());
    let peer_address = Address::new("peer:7001");
    let mut inbound = provider.listen(peer_address.clone(), 64);

    let event_stream = Arc::new(EventStream::new());
    let manager = EndpointManager::new(Address::new("local:7000"), provider, event_stream);

    let endpoint = manager.get_or_add_server(&peer_address);

    endpoint
        .send(b"hello".to_vec())
        .expect("send accepted while connecting or connected");

    let frame = tokio::time::timeout(Duration::from_secs(1), inbound.recv())
        .await
        .expect("frame arrives before timeout")
        .expect("channel stays open");
    assert_eq!(frame, b"hello".to_vec());
}

#[tokio::test]
async fn repeated_lookups_reuse_the_same_endpoint() {
    let provider = Arc::new(LoopbackChannelProvider::new());
    let peer_address = Address::new("peer:7002");
    let _inbound = provider.listen(peer_address.clone(), 64);

    let event_stream = Arc::new(EventStream::new());
    let manager = EndpointManager::new(Address::new("local:7003"), provider, event_stream);

    let first = manager.get_or_add_server(&peer_address);
    let second = manager.get_or_add_server(&peer_address);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(manager.get_server(&peer_address).is_some());
}

#[tokio::test]
async fn client_endpoint_resolves_by_member_id() {
    let provider = Arc::new(LoopbackChannelProvider::new());
    let member = MemberId("peer-node".to_string());
    let peer_address = Address::client(member.0.clone());
    let _inbound = provider.listen(peer_address, 64);

    let event_stream = Arc::new(EventStream::new());
    let manager = EndpointManager::new(Address::new("local:7004"), provider, event_stream);

    let endpoint = manager.get_or_add_client(&member);
    wait_until(|| manager.get_client(&member).is_some()).await;

    endpoint
        .send(b"ping".to_vec())
        .expect("send accepted while connecting or connected");
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Ping;

impl Message for Ping {
    const MESSAGE_TYPE: &'static str = "ping";
}

#[tokio::test]
async fn sending_through_the_actor_system_reaches_a_remote_pid_over_the_endpoint() {
    let provider = Arc::new(LoopbackChannelProvider::new());
    let peer_address = Address::new("peer:8101");
    let mut inbound = provider.listen(peer_address.clone(), 64);

    let system = ActorSystem::<Ping>::with_defaults(Address::new("local:8100"));
    system.attach_endpoint_manager(provider).await;

    let remote_pid = Pid::new(peer_address, ActorId::new());
    system
        .broker()
        .send(Envelope::new(remote_pid.clone(), Ping))
        .await
        .expect("send through the broker resolves the remote pid via the endpoint manager");

    let frame = tokio::time::timeout(Duration::from_secs(1), inbound.recv())
        .await
        .expect("frame arrives before timeout")
        .expect("channel stays open");
    let envelope: Envelope<Ping> =
        serde_json::from_slice(&frame).expect("frame decodes as the envelope that was sent");
    assert_eq!(envelope.target, remote_pid);
}

#[tokio::test]
async fn shutdown_disposes_every_endpoint() {
    let provider = Arc::new(LoopbackChannelProvider::new());
    let peer_address = Address::new("peer:7005");
    let _inbound = provider.listen(peer_address.clone(), 64);

    let event_stream = Arc::new(EventStream::new());
    let manager = EndpointManager::new(Address::new("local:7006"), provider, event_stream);
    manager.get_or_add_server(&peer_address);

    manager.shutdown().await;
    assert!(manager.is_shutting_down());
}
