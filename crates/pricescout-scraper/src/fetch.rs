//! Low-level HTTP helpers shared by the vendor adapters.

use std::time::Duration;

use crate::error::TransportError;

/// Thin wrapper around a configured `reqwest::Client`.
///
/// Each adapter owns its own `Fetcher`; no connection state is shared
/// between concurrent lookups beyond reqwest's internal pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Fetcher {
    /// Builds a fetcher with the given per-request timeout and user-agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the underlying client cannot be
    /// constructed (e.g. invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// Fetches an HTML body, rejecting anti-bot challenge pages.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Http`] — network or timeout failure.
    /// - [`TransportError::UnexpectedStatus`] — any non-2xx status.
    /// - [`TransportError::BotChallenge`] — the body is a challenge page.
    pub async fn get_html(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-AU,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        if looks_like_bot_challenge(&body) {
            return Err(TransportError::BotChallenge {
                url: url.to_owned(),
            });
        }
        Ok(body)
    }

    /// Performs a GET and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::get_html`], plus
    /// [`TransportError::Deserialize`] when the body is not valid JSON.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }

    /// POSTs a JSON body with extra headers and parses the JSON response.
    ///
    /// Used by adapters that talk to third-party search indexes (Algolia).
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::get_json`].
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| TransportError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }
}

/// Recognises the common Cloudflare-style challenge interstitials.
pub(crate) fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_challenge_platform = lowered.contains("/cdn-cgi/challenge-platform/");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");

    has_cloudflare_banner
        || has_challenge_platform
        || (has_just_a_moment && has_cookie_gate)
        || (has_just_a_moment && has_cf_chl)
}
