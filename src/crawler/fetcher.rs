//! HTTP fetcher and network identities
//!
//! Every fetch attempt presents one identity (proxy + user-agent pair) to
//! the site. Identities rotate round-robin; the router additionally asks
//! for a fresh one before retrying a blocked company fetch, since a blocked
//! identity will keep failing.

use reqwest::Client;
use std::time::Duration;

/// Fallback user-agent strings used when the config provides none
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// One (proxy, user-agent) pair presented to the site for a fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Proxy URL, or None for a direct connection
    pub proxy: Option<String>,
    pub user_agent: String,
}

/// Round-robin pool of network identities
#[derive(Debug)]
pub struct IdentityPool {
    proxies: Vec<String>,
    user_agents: Vec<String>,
    cursor: usize,
}

impl IdentityPool {
    pub fn new(proxies: Vec<String>, user_agents: Vec<String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };

        Self {
            proxies,
            user_agents,
            cursor: 0,
        }
    }

    /// Returns the next identity in rotation
    pub fn next(&mut self) -> Identity {
        let index = self.cursor;
        self.cursor = self.cursor.wrapping_add(1);

        Identity {
            proxy: if self.proxies.is_empty() {
                None
            } else {
                Some(self.proxies[index % self.proxies.len()].clone())
            },
            user_agent: self.user_agents[index % self.user_agents.len()].clone(),
        }
    }
}

/// Result of a fetch attempt
///
/// Transport failure is the only error shape; any HTTP response, including
/// error statuses, comes back as `Response` for the router to classify.
#[derive(Debug)]
pub enum FetchOutcome {
    Response { status_code: u16, body: String },
    NetworkError { error: String },
}

/// Builds an HTTP client for one identity
pub fn build_http_client(identity: &Identity) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(identity.user_agent.clone())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &identity.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    builder.build()
}

/// Fetches a URL, retrying transient transport failures
///
/// Timeouts and connection failures are retried twice with a short delay;
/// everything else (including HTTP error statuses) returns on the first
/// attempt, since classifying those is the router's job.
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    const TRANSPORT_RETRIES: u32 = 2;

    let mut attempt = 0;
    loop {
        match client.get(url).send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                return match response.text().await {
                    Ok(body) => FetchOutcome::Response { status_code, body },
                    Err(e) => FetchOutcome::NetworkError {
                        error: e.to_string(),
                    },
                };
            }
            Err(e) if (e.is_timeout() || e.is_connect()) && attempt < TRANSPORT_RETRIES => {
                attempt += 1;
                tracing::debug!(
                    "Transport failure for {} (attempt {}): {}; retrying",
                    url,
                    attempt,
                    e
                );
                tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
            }
            Err(e) => {
                return FetchOutcome::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_rotates_user_agents() {
        let mut pool = IdentityPool::new(vec![], vec!["ua-a".to_string(), "ua-b".to_string()]);

        assert_eq!(pool.next().user_agent, "ua-a");
        assert_eq!(pool.next().user_agent, "ua-b");
        assert_eq!(pool.next().user_agent, "ua-a");
    }

    #[test]
    fn test_pool_rotates_proxies() {
        let mut pool = IdentityPool::new(
            vec![
                "http://proxy-a.example.com:8080".to_string(),
                "http://proxy-b.example.com:8080".to_string(),
            ],
            vec!["ua".to_string()],
        );

        assert_eq!(
            pool.next().proxy.as_deref(),
            Some("http://proxy-a.example.com:8080")
        );
        assert_eq!(
            pool.next().proxy.as_deref(),
            Some("http://proxy-b.example.com:8080")
        );
        assert_eq!(
            pool.next().proxy.as_deref(),
            Some("http://proxy-a.example.com:8080")
        );
    }

    #[test]
    fn test_empty_pool_falls_back_to_defaults() {
        let mut pool = IdentityPool::new(vec![], vec![]);
        let identity = pool.next();

        assert!(identity.proxy.is_none());
        assert!(identity.user_agent.contains("Mozilla"));
    }

    #[test]
    fn test_build_http_client() {
        let mut pool = IdentityPool::new(vec![], vec![]);
        assert!(build_http_client(&pool.next()).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let identity = Identity {
            proxy: Some("http://proxy.example.com:8080".to_string()),
            user_agent: "test".to_string(),
        };
        assert!(build_http_client(&identity).is_ok());
    }
}
