// src/http.rs
// Shared HTTP client for outbound provider calls

use std::time::Duration;

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the shared HTTP client.
///
/// `request_timeout` bounds each outbound call; keep it just above the
/// classification deadline.
pub fn create_shared_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .pool_max_idle_per_host(10)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
