use tracing::debug;

use crate::cache::ResponseCache;
use crate::error::FetchError;

/// Blocking GET returning the response body.
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
}

/// Plain `ureq` transport with the client's default timeouts.
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let mut request = ureq::get(url).header("User-Agent", USER_AGENT);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let resp = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(e) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        };
        resp.into_body()
            .read_to_string()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

const USER_AGENT: &str = concat!("citegraph/", env!("CARGO_PKG_VERSION"));

/// Transport plus response cache. Every provider request goes through here.
pub struct HttpClient {
    transport: Box<dyn Transport>,
    cache: Box<dyn ResponseCache>,
}

impl HttpClient {
    pub fn new(transport: Box<dyn Transport>, cache: Box<dyn ResponseCache>) -> Self {
        Self { transport, cache }
    }

    /// GET `url`, served from the cache when possible. The URL is the cache
    /// key; headers are not part of it.
    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let mut fetch = || {
            debug!(url, "requesting");
            self.transport.get(url, headers)
        };
        self.cache.get_or_fetch(url, &mut fetch)
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Canned responses keyed by URL; unknown URLs answer 404.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub responses: HashMap<String, String>,
        pub requests: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<String, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }
}
