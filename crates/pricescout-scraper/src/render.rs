//! Headless-browser rendering for vendors whose storefronts only produce
//! usable markup after JavaScript runs, or whose anti-automation defenses
//! block plain HTTP fetches.

use std::time::Duration;

use crate::error::TransportError;
use crate::fetch::looks_like_bot_challenge;

/// Renders a page in an isolated headless-browser process.
///
/// Every call spawns its own browser instance and tears it down when the
/// DOM has been dumped. Sessions are never shared or pooled across
/// concurrent lookups; isolation is preferred over efficiency here.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    browser_bin: String,
    timeout_secs: u64,
}

impl PageRenderer {
    #[must_use]
    pub fn new(browser_bin: &str, timeout_secs: u64) -> Self {
        Self {
            browser_bin: browser_bin.to_string(),
            timeout_secs,
        }
    }

    /// Renders `url` and returns the post-JavaScript DOM as HTML.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RenderFailed`] if the browser cannot be
    /// spawned, exits non-zero, produces an empty DOM, or exceeds the
    /// render timeout, and [`TransportError::BotChallenge`] if the rendered
    /// DOM is still a challenge interstitial.
    pub async fn render(&self, url: &str) -> Result<String, TransportError> {
        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            tokio::process::Command::new(&self.browser_bin)
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--no-sandbox")
                .arg("--hide-scrollbars")
                // Let scripted content settle before the DOM dump.
                .arg("--virtual-time-budget=10000")
                .arg("--dump-dom")
                .arg(url)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| TransportError::RenderFailed {
            url: url.to_owned(),
            reason: format!("render exceeded {}s", self.timeout_secs),
        })?
        .map_err(|e| TransportError::RenderFailed {
            url: url.to_owned(),
            reason: format!("failed to spawn {}: {e}", self.browser_bin),
        })?;

        if !output.status.success() {
            return Err(TransportError::RenderFailed {
                url: url.to_owned(),
                reason: format!("{} exited with {}", self.browser_bin, output.status),
            });
        }

        let body = String::from_utf8_lossy(&output.stdout).to_string();
        if body.trim().is_empty() {
            return Err(TransportError::RenderFailed {
                url: url.to_owned(),
                reason: "empty DOM dump".to_string(),
            });
        }
        if looks_like_bot_challenge(&body) {
            return Err(TransportError::BotChallenge {
                url: url.to_owned(),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_browser_binary_is_a_render_failure() {
        let renderer = PageRenderer::new("definitely-not-a-browser-bin", 5);
        let err = renderer
            .render("https://example.invalid/")
            .await
            .expect_err("binary does not exist");
        assert!(matches!(err, TransportError::RenderFailed { .. }));
    }
}
