//! Blocking HTTP plumbing.
//!
//! Every binary builds one [`HttpClient`] from an explicit [`HttpConfig`] and
//! hands it to the code that issues requests. The [`Fetch`] trait is the seam
//! that lets tests swap the network out.

use std::io::Read;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::config::RuntimeConfig;

/// Upper bound for a single response body.
pub const MAX_BODY_BYTES: u64 = 20 * 1024 * 1024;

/// Request settings shared by every call made during a run.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn from_runtime(runtime: &RuntimeConfig, timeout: Duration) -> Self {
        Self {
            user_agent: runtime.user_agent.clone(),
            timeout,
        }
    }
}

pub trait Fetch {
    /// GETs `url` and returns the body decoded as text.
    fn get_text(&self, url: &str) -> Result<String>;

    /// GETs `url` and returns the raw body.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// `ureq` agent configured once per run.
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build();
        Self { agent }
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        // ureq reports 4xx/5xx as `Error::Status`, so only 2xx/3xx reach us.
        self.agent
            .get(url)
            .call()
            .with_context(|| format!("GET {url}"))
    }
}

impl Fetch for HttpClient {
    fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url)?;
        response
            .into_string()
            .with_context(|| format!("reading body of {url}"))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url)?;
        read_capped(response.into_reader(), MAX_BODY_BYTES)
            .with_context(|| format!("reading body of {url}"))
    }
}

/// Reads `reader` to the end, failing once more than `limit` bytes arrive.
fn read_capped(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    if body.len() as u64 > limit {
        bail!("response body exceeds {limit} bytes");
    }
    Ok(body)
}

/// Fixed delay inserted between consecutive outbound requests.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    primed: bool,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            primed: false,
        }
    }

    /// Call right before issuing a request. Sleeps unless this is the first.
    pub fn wait(&mut self) {
        if self.primed && !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        self.primed = true;
    }
}
