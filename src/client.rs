use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use reqwest::Url;
use tracing::{Level, debug, trace};

use crate::config::{DEFAULT_ENDPOINT, load_config};
use crate::error::{Error, GeocodeError};
use crate::pacing;
use crate::params::{GeocodeParams, geocode_url};
use crate::response::GeocodeResult;
use crate::transport::{Clock, HttpTransport, SystemClock, Transport};

/// Client for the OpenCage forward geocoding API.
///
/// Calls on one client are serialized: at most one request is in flight at a
/// time, and unless disabled via [`Client::with_rate_limit_sleep`] each call
/// first sleeps long enough to spread the remaining quota evenly over what is
/// left of the current rate window.
///
/// There is no overall deadline beyond the transport timeout. A caller that
/// gives up on a call from another thread does not stop the in-flight request,
/// and other callers stay blocked behind it until it returns.
pub struct Client {
    key: String,
    url: Url,
    rate_limit_sleep: bool,

    transport: Box<dyn Transport>,
    /// Whether `transport` is still the built-in [`HttpTransport`].
    default_transport: bool,
    clock: Box<dyn Clock>,

    /// Earliest time the next request may go out.
    next_allowed: Mutex<Option<SystemTime>>,
}

impl Client {
    /// Creates a client for `key` against the default endpoint.
    ///
    /// An empty or blank key is rejected here instead of at the first request.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(Error::MissingKey);
        }

        let transport = HttpTransport::new().map_err(Error::Transport)?;

        Ok(Self {
            key,
            url: parse_endpoint(DEFAULT_ENDPOINT)?,
            rate_limit_sleep: true,
            transport: Box::new(transport),
            default_transport: true,
            clock: Box::new(SystemClock),
            next_allowed: Mutex::new(None),
        })
    }

    /// Creates a client from `OPENCAGE_API_KEY` / `OPENCAGE_URL` or an
    /// `.opencagerc` file.
    ///
    /// This is equivalent to `Client::from_config(None, None)`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `key`/`url` arguments
    /// - environment variables `OPENCAGE_API_KEY` / `OPENCAGE_URL`
    /// - config file from `OPENCAGE_RC`, `./.opencagerc` or `~/.opencagerc`
    pub fn from_config(key: Option<String>, url: Option<String>) -> anyhow::Result<Self> {
        let cfg = load_config(key, url)?;
        Ok(Self::new(cfg.key)?.with_url(&cfg.url)?)
    }

    /// Points the client at another endpoint; requests go to `<url>/json`.
    pub fn with_url(mut self, url: &str) -> Result<Self, Error> {
        self.url = parse_endpoint(url)?;
        Ok(self)
    }

    /// Enables or disables the automatic sleep between calls (enabled by default).
    ///
    /// Disabling it is not recommended: the service rejects requests once
    /// the quota is used up.
    pub fn with_rate_limit_sleep(mut self, enabled: bool) -> Self {
        self.rate_limit_sleep = enabled;
        self
    }

    /// Timeout for each HTTP request of the default transport.
    ///
    /// Has no effect once a transport was injected with
    /// [`Client::with_transport`]; that transport owns its own timeouts.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        if self.default_transport {
            let transport = HttpTransport::with_timeout(timeout).map_err(Error::Transport)?;
            self.transport = Box::new(transport);
        }
        Ok(self)
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self.default_transport = false;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Geocodes a free-text query.
    ///
    /// `params` is optional; pass `None` when no specific options are needed.
    /// A response whose embedded status code is not 200 is returned as
    /// [`Error::Geocode`].
    pub fn geocode(
        &self,
        query: &str,
        params: Option<&GeocodeParams>,
    ) -> Result<GeocodeResult, Error> {
        // Held for the whole call: the next pacing decision depends on the
        // quota reported by this response.
        let mut next_allowed = self
            .next_allowed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.rate_limit_sleep {
            if let Some(wait) = pacing::wait(*next_allowed, self.clock.now()) {
                debug!(wait_ms = wait.as_millis() as u64, "pacing geocode request");
                self.clock.sleep(wait);
            }
        }

        let url = geocode_url(&self.url, &self.key, query, params);
        if tracing::enabled!(Level::TRACE) {
            let sent: Vec<&str> = params
                .map(|p| p.query_pairs().into_iter().map(|(name, _)| name).collect())
                .unwrap_or_default();
            trace!(query, params = ?sent, "geocode request");
        }

        let body = self.transport.get(url.as_str()).map_err(Error::Transport)?;
        let result: GeocodeResult = serde_json::from_reader(body)?;

        if self.rate_limit_sleep {
            if let Some(rate) = &result.rate {
                let now = self.clock.now();
                let next = pacing::next_allowed(*next_allowed, rate, now);
                debug!(
                    remaining = rate.remaining,
                    reset = rate.reset,
                    interval_ms = next.duration_since(now).unwrap_or_default().as_millis() as u64,
                    "updated geocode pacing"
                );
                *next_allowed = Some(next);
            }
        }

        if !result.is_success() {
            return Err(GeocodeError::new(result).into());
        }

        Ok(result)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url.as_str())
            .field("rate_limit_sleep", &self.rate_limit_sleep)
            .finish_non_exhaustive()
    }
}

fn parse_endpoint(url: &str) -> Result<Url, Error> {
    let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    Ok(url)
}
