use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the questionnaire service lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a config for the given base URL with the default timeout.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `QUESTIONNAIRE_API_URL`, falling back to the local default when
    /// the variable is unset, blank or not a valid URL.
    #[must_use]
    pub fn from_env() -> Self {
        let configured = env::var("QUESTIONNAIRE_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .and_then(|value| match Url::parse(value.trim()) {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(%value, %err, "ignoring invalid QUESTIONNAIRE_API_URL");
                    None
                }
            });
        Self::new(configured.unwrap_or_else(default_api_url))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// HTTP client settings shared by the gateway and auth service.
    ///
    /// `request_timeout` bounds both connecting and the whole request.
    #[must_use]
    pub fn client_builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .connect_timeout(self.request_timeout)
            .timeout(self.request_timeout)
    }

    /// Absolute URL for `path` below the API base, e.g. `questions/start`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let mut base = self.api_base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_api_url())
    }
}

fn default_api_url() -> Url {
    match Url::parse(DEFAULT_API_URL) {
        Ok(url) => url,
        Err(_) => unreachable!("default API URL is valid"),
    }
}
