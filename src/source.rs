//! Retrieval of raw table text from files, HTTP endpoints or embedded data.

use std::borrow::Cow;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::error::SourceError;
use crate::session::HttpSession;

/// Ten-model sample scores table shipped with the binary.
pub const SAMPLE_SCORES: &str = include_str!("../data/sample_scores.csv");
/// Metadata companion of [`SAMPLE_SCORES`].
pub const SAMPLE_META: &str = include_str!("../data/sample_meta.csv");

pub type FetchResult = std::result::Result<String, SourceError>;

/// Anything that can produce the raw text of one table.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human readable location, used in log lines.
    fn describe(&self) -> String;

    async fn fetch(&self) -> FetchResult;
}

/// Table served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    session: HttpSession,
    url: Url,
}

impl HttpSource {
    pub fn new(session: HttpSession, url: Url) -> Self {
        Self { session, url }
    }
}

#[async_trait]
impl TableSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> FetchResult {
        let url = self.url.to_string();
        let response = self
            .session
            .client()
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| SourceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| SourceError::Transport { url, source })
    }
}

/// Table read from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> FetchResult {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.describe(),
                source,
            })
    }
}

/// Table text held in memory.
#[derive(Debug, Clone)]
pub struct InlineSource {
    label: &'static str,
    text: Cow<'static, str>,
}

impl InlineSource {
    pub fn new(label: &'static str, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }

    pub fn sample_scores() -> Self {
        Self::new("embedded sample scores", SAMPLE_SCORES)
    }

    pub fn sample_meta() -> Self {
        Self::new("embedded sample metadata", SAMPLE_META)
    }

    pub fn empty() -> Self {
        Self::new("none", "")
    }
}

#[async_trait]
impl TableSource for InlineSource {
    fn describe(&self) -> String {
        self.label.to_owned()
    }

    async fn fetch(&self) -> FetchResult {
        Ok(self.text.clone().into_owned())
    }
}

/// Maps a location string to a source: absolute URLs and locations relative
/// to the session's base URL are fetched over HTTP, everything else is read
/// from disk.
pub fn resolve(
    location: &str,
    session: &HttpSession,
) -> std::result::Result<Box<dyn TableSource>, SourceError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(SourceError::Location(location.to_owned()));
    }

    if location.starts_with("http://") || location.starts_with("https://") {
        let url = Url::parse(location).map_err(|source| SourceError::InvalidUrl {
            location: location.to_owned(),
            source,
        })?;
        return Ok(Box::new(HttpSource::new(session.clone(), url)));
    }

    if let Some(base) = session.base_url() {
        let url = base
            .join(location)
            .map_err(|source| SourceError::InvalidUrl {
                location: location.to_owned(),
                source,
            })?;
        return Ok(Box::new(HttpSource::new(session.clone(), url)));
    }

    Ok(Box::new(FileSource::new(location)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::session::SessionConfig;

    fn session(base: Option<&str>) -> HttpSession {
        let base = base.map(|value| Url::parse(value).expect("valid base url"));
        HttpSession::new(&SessionConfig::new(base, Duration::from_secs(5)))
            .expect("session should build")
    }

    #[test]
    fn resolves_absolute_urls() {
        let source = resolve("https://example.com/data/scores.csv", &session(None)).unwrap();
        assert_eq!(source.describe(), "https://example.com/data/scores.csv");
    }

    #[test]
    fn resolves_relative_against_base() {
        let source = resolve("meta.csv", &session(Some("https://example.com/board/"))).unwrap();
        assert_eq!(source.describe(), "https://example.com/board/meta.csv");
    }

    #[test]
    fn falls_back_to_file_paths() {
        let source = resolve("data/scores.csv", &session(None)).unwrap();
        assert_eq!(source.describe(), "data/scores.csv");
    }

    #[test]
    fn rejects_blank_location() {
        assert_matches!(
            resolve("  ", &session(None)).err(),
            Some(SourceError::Location(_))
        );
    }

    #[test]
    fn malformed_url_keeps_parse_error() {
        assert_matches!(
            resolve("http://", &session(None)).err(),
            Some(SourceError::InvalidUrl { source: url::ParseError::EmptyHost, .. })
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let source = FileSource::new("definitely/not/here.csv");
        assert_matches!(source.fetch().await, Err(SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn inline_sample_has_header() {
        let text = InlineSource::sample_scores().fetch().await.unwrap();
        assert!(text.starts_with("name,cost_usd,cost_rmb,provider,MRCR"));
    }

    #[cfg(feature = "http-mock")]
    mod http {
        use httpmock::prelude::*;

        use super::*;

        #[tokio::test]
        async fn fetches_table_over_http() {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET).path("/scores.csv");
                    then.status(200).body("name,MRCR\na,1\n");
                })
                .await;

            let source = resolve("scores.csv", &session(Some(&server.url("/")))).unwrap();
            let text = source.fetch().await.unwrap();
            assert_eq!(text, "name,MRCR\na,1\n");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn non_success_status_is_error() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/meta.csv");
                    then.status(404);
                })
                .await;

            let source = resolve(&server.url("/meta.csv"), &session(None)).unwrap();
            assert_matches!(
                source.fetch().await,
                Err(SourceError::Status { status: 404, .. })
            );
        }
    }
}
