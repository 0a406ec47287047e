use security::SimKey;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Listener address for RAN connections.
    pub bind_addr: SocketAddr,

    // Human readable AMF name signaled in SetupResponse
    pub amf_name: String,

    // Pre-shared subscriber key
    pub sim_key: SimKey,

    // A connection without a complete frame for this long is abandoned.
    pub idle_timeout: Duration,

    // Bound on the outbound fetch performed for a DataRequest.
    pub fetch_timeout: Duration,

    // Session type whose establishment accept carries `reveal_value` in
    // place of a placeholder address.  Disabled when unset.
    pub reveal_session_type: Option<u8>,
    pub reveal_value: Option<String>,
}
