//! Source fetching for the registry document
//!
//! Remote sources are fetched with a blocking `ureq` agent bounded by a
//! global timeout and a body size limit. Sources without an `http://` or
//! `https://` scheme are read from the local filesystem.

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Default registry source: the GSA dotgov domain list
pub const DOTGOV_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/GSA/data/master/dotgov-domains/current-full.csv";

/// Default timeout for one fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum response body size (64 MiB)
pub const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

const USER_AGENT: &str = concat!("isitgov/", env!("CARGO_PKG_VERSION"));

/// Something that can produce the raw registry document
pub trait Fetcher: Send + Sync {
    /// Fetch the raw document bytes
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    /// Human-readable description of the source, used in logs
    fn source(&self) -> String;
}

/// Fetch over HTTP(S)
pub struct HttpFetcher {
    url: String,
    agent: ureq::Agent,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration, max_body_bytes: u64) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            url: url.into(),
            agent,
            max_body_bytes,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        info!("fetching registry from {}", self.url);
        let mut response = self
            .agent
            .get(&self.url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(FetchError::from)?;

        response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
            .map_err(|e| match FetchError::from(e) {
                FetchError::Transport(msg) => FetchError::Body(msg),
                other => other,
            })
    }

    fn source(&self) -> String {
        self.url.clone()
    }
}

/// Read the document from a local file
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        info!("reading registry from {}", self.path.display());
        std::fs::read(&self.path)
            .map_err(|e| FetchError::Io(format!("{}: {}", self.path.display(), e)))
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick a fetcher for a source string: HTTP(S) URLs go through [`HttpFetcher`],
/// anything else is treated as a file path.
pub fn fetcher_for_source(
    source: &str,
    timeout: Duration,
    max_body_bytes: u64,
) -> Box<dyn Fetcher> {
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpFetcher::new(source, timeout, max_body_bytes))
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        Box::new(FileFetcher::new(path))
    }
}

/// Failure to retrieve the registry document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, TLS or protocol failure
    Transport(String),
    /// Server answered with a non-success status
    Status(u16),
    /// The request exceeded the configured timeout
    Timeout,
    /// Local file could not be read
    Io(String),
    /// Response body could not be read (including size limit exceeded)
    Body(String),
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => FetchError::Status(code),
            ureq::Error::Timeout(_) => FetchError::Timeout,
            ureq::Error::BodyExceedsLimit(limit) => {
                FetchError::Body(format!("body exceeds limit of {} bytes", limit))
            }
            other => FetchError::Transport(other.to_string()),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {}", e),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Io(e) => write!(f, "read error: {}", e),
            FetchError::Body(e) => write!(f, "body error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serve exactly one HTTP response on a local port, returning its URL
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/current-full.csv", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        });
        (url, handle)
    }

    #[test]
    fn test_http_fetcher_ok() {
        let (url, server) = serve_once("200 OK", "hello");
        let fetcher = HttpFetcher::new(url, Duration::from_secs(5), 1024);
        assert_eq!(fetcher.fetch().unwrap(), b"hello".to_vec());
        server.join().unwrap();
    }

    #[test]
    fn test_http_fetcher_error_status() {
        let (url, server) = serve_once("503 Service Unavailable", "down");
        let fetcher = HttpFetcher::new(url, Duration::from_secs(5), 1024);
        assert_eq!(fetcher.fetch(), Err(FetchError::Status(503)));
        server.join().unwrap();
    }

    #[test]
    fn test_http_fetcher_body_limit() {
        let (url, server) = serve_once("200 OK", "this body is longer than ten bytes");
        let fetcher = HttpFetcher::new(url, Duration::from_secs(5), 10);
        assert!(matches!(fetcher.fetch(), Err(FetchError::Body(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_file_fetcher() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "header\nLBL.GOV,Federal,DOE,LBNL,Berkeley,CA").unwrap();

        let fetcher = FileFetcher::new(file.path());
        let bytes = fetcher.fetch().unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("LBL.GOV"));
    }

    #[test]
    fn test_file_fetcher_missing() {
        let fetcher = FileFetcher::new("/nonexistent/isitgov/current-full.csv");
        assert!(matches!(fetcher.fetch(), Err(FetchError::Io(_))));
    }

    #[test]
    fn test_fetcher_for_source() {
        let http = fetcher_for_source(DOTGOV_REGISTRY_URL, DEFAULT_FETCH_TIMEOUT, 1024);
        assert_eq!(http.source(), DOTGOV_REGISTRY_URL);

        let file = fetcher_for_source("file:///tmp/registry.csv", DEFAULT_FETCH_TIMEOUT, 1024);
        assert_eq!(file.source(), "/tmp/registry.csv");

        let plain = fetcher_for_source("./registry.csv", DEFAULT_FETCH_TIMEOUT, 1024);
        assert_eq!(plain.source(), "./registry.csv");
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::Status(503).to_string(),
            "unexpected HTTP status 503"
        );
        assert!(FetchError::Timeout.to_string().contains("timed out"));
    }
}
