//! Client for the remote skip-segment service.

use std::time::Duration;

use serde::Deserialize;

use crate::config::SponsorBlockConfig;
use crate::error::{Error, Result};

use super::Segment;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the skip-segment response. The bounds arrive as a numeric
/// array; field casing varies across service versions.
#[derive(Debug, Deserialize)]
struct SkipSegment {
    #[serde(alias = "Segment", alias = "SEGMENT")]
    segment: Vec<f64>,
}

pub struct SponsorBlockClient {
    client: reqwest::Client,
    base_url: String,
    category: String,
}

impl SponsorBlockClient {
    pub fn new(config: &SponsorBlockConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
        }
    }

    /// Fetch the spans the service marks for removal, ascending by start.
    ///
    /// Any transport failure or non-success status degrades to "no
    /// segments" — trimming is an enhancement, not a requirement. A success
    /// response that cannot be decoded, or a segment with fewer than two
    /// bounds, is a [`Error::Parse`].
    pub async fn fetch_skip_segments(&self, content_id: &str) -> Result<Vec<Segment>> {
        let url = format!("{}/api/skipSegments", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[("videoID", content_id), ("category", self.category.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Skip-segment lookup for {} failed: {}", content_id, e);
                return Ok(Vec::new());
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "No skip segments for {} (status {})",
                content_id,
                response.status()
            );
            return Ok(Vec::new());
        }

        let entries: Vec<SkipSegment> = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("skip-segment response: {e}")))?;

        entries
            .into_iter()
            .map(|entry| match entry.segment[..] {
                [start, end, ..] => Ok(Segment::new(start, end)),
                _ => Err(Error::Parse(format!(
                    "skip segment for {content_id} has {} bounds, expected 2",
                    entry.segment.len()
                ))),
            })
            .collect()
    }
}
