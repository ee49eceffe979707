//! Per-run robots.txt cache
//!
//! robots.txt is fetched at most once per host and run, through the same
//! fetcher as every other page.

use crate::crawler::Fetcher;
use crate::robots::ParsedRobots;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Answers "may this URL be fetched?" for one run
#[derive(Debug)]
pub struct RobotsGate {
    user_agent: String,
    hosts: Mutex<HashMap<String, Arc<ParsedRobots>>>,
}

impl RobotsGate {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Checks `url` against its host's robots.txt, fetching it on first use
    ///
    /// A robots.txt that cannot be fetched allows everything.
    pub async fn is_allowed<F: Fetcher>(&self, fetcher: &F, url: &Url) -> bool {
        let Some(origin) = robots_origin(url) else {
            return true;
        };

        let robots = {
            // Held across the fetch so concurrent tasks wait for one download
            let mut hosts = self.hosts.lock().await;
            match hosts.get(&origin) {
                Some(robots) => Arc::clone(robots),
                None => {
                    let robots = Arc::new(load_robots(fetcher, &origin).await);
                    hosts.insert(origin, Arc::clone(&robots));
                    robots
                }
            }
        };

        robots.is_allowed(url, &self.user_agent)
    }

    /// Number of hosts whose robots.txt has been loaded
    pub async fn cached_hosts(&self) -> usize {
        self.hosts.lock().await.len()
    }
}

fn robots_origin(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

async fn load_robots<F: Fetcher>(fetcher: &F, origin: &str) -> ParsedRobots {
    let Ok(robots_url) = Url::parse(&format!("{}/robots.txt", origin)) else {
        return ParsedRobots::allow_all();
    };

    match fetcher.fetch(&robots_url).await {
        Ok(page) => {
            tracing::debug!("Loaded robots.txt for {}", origin);
            ParsedRobots::from_content(&page.body)
        }
        Err(e) => {
            tracing::debug!("No robots.txt for {} ({}), allowing all", origin, e);
            ParsedRobots::allow_all()
        }
    }
}
