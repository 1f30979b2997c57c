use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use gust_instruments::{OperationRecord, Reporter};
use url::Url;

use crate::response::InstrumentedResponse;

/// Per-request timeout. A request that exceeds it fails its iteration like any other transport
/// error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client that records one operation per request against the run's reporter.
///
/// Each virtual user owns its own client. Connections are pooled and reused across the owning
/// user's iterations, they are never shared between users.
#[derive(Clone)]
pub struct HttpClientInstrumented {
    inner: reqwest::Client,
    base_url: Url,
    reporter: Arc<Reporter>,
}

impl HttpClientInstrumented {
    pub fn new(base_url: Url, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build the HTTP client")?;

        Ok(Self {
            inner,
            base_url,
            reporter,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue one GET request against `path`, resolved relative to the base URL.
    ///
    /// The request is recorded whether it succeeds or fails. A transport failure is recorded
    /// and then propagated to the caller; a response with a non-success status is not an error
    /// here, interpreting the status is left to the caller's checks.
    pub async fn get(&self, path: &str) -> anyhow::Result<InstrumentedResponse> {
        let url = self.base_url.join(path).with_context(|| {
            format!(
                "Cannot resolve request path '{}' against {}",
                path, self.base_url
            )
        })?;
        let url_display = url.to_string();

        let record = OperationRecord::new(format!("get {}", path));
        let started = Instant::now();
        let result = async {
            let response = self.inner.get(url).send().await?;
            let status = response.status();
            // Drain the body so that the measured time covers the full response and the
            // connection goes back to the pool.
            response.bytes().await?;
            Ok::<_, reqwest::Error>(status)
        }
        .await;
        let elapsed = started.elapsed();

        let mut record = record.finish(&result).with_elapsed(elapsed);
        if let Ok(status) = &result {
            record = record.with_attr("status", status.as_str());
        }
        self.reporter.add_operation(record);

        let status = result.with_context(|| format!("GET request to {} failed", url_display))?;

        Ok(InstrumentedResponse::new(status.as_u16(), elapsed))
    }
}

impl fmt::Debug for HttpClientInstrumented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientInstrumented")
            .field("base_url", &self.base_url)
            .finish()
    }
}
