//! Local auto-start helpers: port probing and readiness polling.

use std::net::{IpAddr, TcpListener};
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use super::ClientError;

/// Whether `host` names the local machine
pub fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

/// Interface a spawned daemon binds for a loopback `host`
pub fn bind_host(host: &str) -> String {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
        Ok(IpAddr::V4(ip)) => ip.to_string(),
        Err(_) => "127.0.0.1".to_string(),
    }
}

/// Check if a port is free by binding it and dropping the listener at once.
///
/// Only a hint: another process may take the port before the daemon binds.
pub fn is_port_available(host: &str, port: u16) -> bool {
    match TcpListener::bind(format!("{}:{}", bind_host(host), port)) {
        Ok(listener) => listener.local_addr().is_ok(),
        Err(_) => false,
    }
}

/// Poll `/api/health` until it answers 200 or attempts run out
pub async fn wait_for_health(
    http: &reqwest::Client,
    base: &Url,
    attempts: u32,
    interval: Duration,
) -> Result<(), ClientError> {
    let health_url = base
        .join("api/health")
        .map_err(|e| ClientError::DaemonStart(format!("invalid health URL: {}", e)))?;
    debug!("Waiting for daemon at {}", health_url);

    for attempt in 1..=attempts {
        match http.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Daemon ready at {} after {} probe(s)", base, attempt);
                return Ok(());
            }
            Ok(response) => {
                debug!("Health check returned status {}, retrying...", response.status());
            }
            Err(e) => {
                debug!("Health check failed: {}, retrying...", e);
            }
        }
        tokio::time::sleep(interval).await;
    }

    Err(ClientError::DaemonStart(format!(
        "no healthy response from {} after {} attempts",
        health_url, attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("localhost"));
        assert!(is_loopback("LOCALHOST"));
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("127.8.0.1"));
        assert!(is_loopback("::1"));
        assert!(is_loopback("[::1]"));
        assert!(!is_loopback("10.0.0.5"));
        assert!(!is_loopback("example.com"));
    }

    #[test]
    fn test_bind_host() {
        assert_eq!(bind_host("localhost"), "127.0.0.1");
        assert_eq!(bind_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(bind_host("::1"), "[::1]");
    }

    #[test]
    fn test_port_probe_sees_bound_port() {
        let held = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = held.local_addr().unwrap().port();
        assert!(!is_port_available("localhost", port));

        drop(held);
        assert!(is_port_available("localhost", port));
    }

    #[tokio::test]
    async fn test_wait_for_health_gives_up() {
        // Reserve a port, then free it so nothing answers
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let base = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let http = reqwest::Client::new();

        let err = wait_for_health(&http, &base, 2, Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::DaemonStart(_)));
    }
}
