//! Remote compiler client.
//!
//! Two stateless calls, each a single `POST` of raw bytes:
//! - `{base}/compile-to-intermediate`: Cairo source in, Sierra JSON out
//! - `{base}/compile-to-final`: Sierra JSON in, CASM out
//!
//! No retries and no caching. Every failure (transport, status, timeout, body)
//! becomes `StarkcError::RemoteCompilation` tagged with the stage.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::StarkcResult;

/// The two-stage remote compilation seam.
#[async_trait]
pub trait RemoteCompiler: Send + Sync {
    async fn to_intermediate(&self, source: Bytes) -> StarkcResult<String>;
    async fn to_final(&self, intermediate: Bytes) -> StarkcResult<String>;
}

#[cfg(feature = "http")]
pub use http::HttpRemoteCompiler;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::header::CONTENT_TYPE;
    use tracing::debug;

    use super::RemoteCompiler;
    use crate::config::CompilerConfig;
    use crate::errors::{CompileStage, StarkcError, StarkcResult};

    const OCTET_STREAM: &str = "application/octet-stream";

    /// Longest slice of an error response body kept in the error message.
    const MAX_ERROR_BODY_CHARS: usize = 2048;

    /// `RemoteCompiler` over HTTP with one pooled client.
    #[derive(Debug, Clone)]
    pub struct HttpRemoteCompiler {
        client: reqwest::Client,
        config: CompilerConfig,
    }

    impl HttpRemoteCompiler {
        pub fn new(config: CompilerConfig) -> StarkcResult<Self> {
            let client = reqwest::Client::builder()
                .timeout(config.timeout())
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| {
                    StarkcError::invalid_argument(format!("failed to build http client: {e}"))
                })?;
            Ok(Self { client, config })
        }

        pub fn config(&self) -> &CompilerConfig {
            &self.config
        }

        async fn post_stage(&self, stage: CompileStage, body: Bytes) -> StarkcResult<String> {
            let url = self.config.endpoint_url(stage.endpoint());
            debug!(%stage, %url, bytes = body.len(), "posting to remote compiler");

            let resp = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, OCTET_STREAM)
                .body(body)
                .send()
                .await
                .map_err(|e| StarkcError::remote(stage, self.describe(&e)))?;

            let status = resp.status();
            if !status.is_success() {
                // The compiler puts its diagnostics in the body.
                let detail = resp.text().await.unwrap_or_default();
                let detail = truncate_chars(detail.trim(), MAX_ERROR_BODY_CHARS);
                return Err(StarkcError::remote(
                    stage,
                    if detail.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        format!("HTTP {status}: {detail}")
                    },
                ));
            }

            let text = resp.text().await.map_err(|e| {
                StarkcError::remote(stage, format!("unreadable response body: {}", self.describe(&e)))
            })?;
            debug!(%stage, bytes = text.len(), "remote compiler responded");
            Ok(text)
        }

        fn describe(&self, e: &reqwest::Error) -> String {
            if e.is_timeout() {
                format!("timed out after {} ms", self.config.timeout_ms)
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                e.to_string()
            }
        }
    }

    #[async_trait]
    impl RemoteCompiler for HttpRemoteCompiler {
        async fn to_intermediate(&self, source: Bytes) -> StarkcResult<String> {
            self.post_stage(CompileStage::ToIntermediate, source).await
        }

        async fn to_final(&self, intermediate: Bytes) -> StarkcResult<String> {
            self.post_stage(CompileStage::ToFinal, intermediate).await
        }
    }

    fn truncate_chars(s: &str, max: usize) -> &str {
        match s.char_indices().nth(max) {
            Some((i, _)) => &s[..i],
            None => s,
        }
    }

}
