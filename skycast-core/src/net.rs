use std::net::UdpSocket;

// `connect` on a UDP socket performs a local route lookup; no datagram is
// ever sent. Public DNS anycast addresses are stable targets for that
// lookup over both address families.
const PROBE_TARGETS: [&str; 2] = ["8.8.8.8:53", "[2001:4860:4860::8888]:53"];

/// Reports whether the host currently has a usable network route.
///
/// Pure probe: no traffic is generated and no state is kept. Returns
/// `false` when no active interface can route to the outside world,
/// regardless of which transport (wired, wireless, cellular modem) would
/// carry it.
pub fn network_available() -> bool {
    PROBE_TARGETS.iter().any(|target| route_exists(target))
}

fn route_exists(target: &str) -> bool {
    let bind_addr = if target.starts_with('[') {
        "[::]:0"
    } else {
        "0.0.0.0:0"
    };

    UdpSocket::bind(bind_addr)
        .and_then(|socket| socket.connect(target))
        .is_ok()
}
