//! Tunnel verification tests
//!
//! Exercise the real TCP proxy probe against local listeners and check the
//! selector's state properties over randomized modes.

use pirate_net::{
    ProxyProbe, Socks5Endpoint, TcpProxyProbe, TorStatus, TorStatusHandle, TunnelMode,
    TunnelSelector,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_tcp_probe_reaches_listening_proxy() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let endpoint = Socks5Endpoint::parse(&format!("socks5://127.0.0.1:{}", port)).unwrap();
    let probe = TcpProxyProbe::new(Duration::from_secs(2));

    assert!(probe.probe(&endpoint).await.is_ok());
}

#[tokio::test]
async fn test_tcp_probe_fails_when_nothing_listens() {
    // Bind then drop to get a port that is very likely closed.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let endpoint = Socks5Endpoint::parse(&format!("socks5://127.0.0.1:{}", port)).unwrap();
    let probe = TcpProxyProbe::new(Duration::from_secs(2));

    assert!(probe.probe(&endpoint).await.is_err());
}

#[tokio::test]
async fn test_selector_verifies_socks5_against_live_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let selector = TunnelSelector::new(Arc::new(TorStatusHandle::new()));
    selector.set_tunnel(TunnelMode::socks5(Some(&format!(
        "socks5://127.0.0.1:{}",
        port
    ))));

    let verification = selector.verify(&selector.get_tunnel()).await;
    assert!(verification.reachable, "{:?}", verification.message);
}

#[tokio::test]
async fn test_selector_follows_tor_bootstrap() {
    let tor = TorStatusHandle::new();
    let selector = TunnelSelector::new(Arc::new(tor.clone()));

    assert!(!selector.verify(&TunnelMode::Tor).await.reachable);

    tor.set(TorStatus::Bootstrapping(90)).await;
    assert!(!selector.verify(&TunnelMode::Tor).await.reachable);

    tor.set(TorStatus::Ready).await;
    assert!(selector.verify(&TunnelMode::Tor).await.reachable);

    tor.set(TorStatus::Error).await;
    assert!(!selector.verify(&TunnelMode::Tor).await.reachable);
}

fn tunnel_mode_strategy() -> impl Strategy<Value = TunnelMode> {
    prop_oneof![
        Just(TunnelMode::Tor),
        Just(TunnelMode::Direct),
        (
            prop::string::string_regex("[a-z][a-z0-9.-]{0,20}").unwrap(),
            1u16..=65535
        )
            .prop_map(|(host, port)| TunnelMode::Socks5 {
                url: format!("socks5://{}:{}", host, port),
            }),
    ]
}

proptest! {
    /// Property: get_tunnel returns whatever set_tunnel stored
    #[test]
    fn prop_set_get_round_trip(modes in prop::collection::vec(tunnel_mode_strategy(), 1..8)) {
        let selector = TunnelSelector::new(Arc::new(TorStatusHandle::new()));
        for mode in modes {
            selector.set_tunnel(mode.clone());
            prop_assert_eq!(selector.get_tunnel(), mode);
        }
    }

    /// Property: the textual form parses back to the same mode
    #[test]
    fn prop_label_parses_back(mode in tunnel_mode_strategy()) {
        let parsed = TunnelMode::from_parts(mode.label(), mode.socks5_url()).unwrap();
        prop_assert_eq!(parsed, mode);
    }
}
