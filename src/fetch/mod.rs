pub mod tables;

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::error::{PipelineError, Result};
use crate::process::RawTable;

pub use tables::{parse_html_tables, select_table};

const RETRY_DELAY: Duration = Duration::from_secs(1);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
/// Rows of the fetched table echoed to the log.
pub const PREVIEW_ROWS: usize = 5;

/// HTTP client for the book list. Certificates are verified unless the
/// config explicitly turns that off.
pub fn build_client(cfg: &FetchConfig) -> Result<Client> {
    if cfg.accept_invalid_certs {
        warn!(
            url = %cfg.url,
            "TLS certificate verification is disabled; the fetched page could be tampered with"
        );
    }
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(cfg.timeout)
        .danger_accept_invalid_certs(cfg.accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// GET `url` and return the body.
///
/// Transport errors and 5xx responses are retried until `max_attempts`
/// requests have been made in total, one second apart. Any other non-success status fails
/// straight away.
#[tracing::instrument(level = "info", skip(client), fields(url = %url))]
pub async fn fetch_page(client: &Client, url: &Url, max_attempts: usize) -> Result<String> {
    // zero would never send a request
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match client.get(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => {
                    debug!(bytes = body.len(), attempt, "fetched page");
                    return Ok(body);
                }
                Err(e) if attempt < max_attempts => {
                    warn!(attempt, error = %e, "reading body failed, retrying");
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            },
            Ok(resp) if resp.status().is_server_error() && attempt < max_attempts => {
                warn!(attempt, status = %resp.status(), "server error, retrying");
                sleep(RETRY_DELAY).await;
            }
            Ok(resp) => {
                return Err(PipelineError::HttpStatus {
                    url: url.to_string(),
                    status: resp.status(),
                })
            }
            Err(e) if attempt < max_attempts => {
                warn!(attempt, error = %e, "request failed, retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Fetch the page and parse every table on it.
pub async fn fetch_html_tables(client: &Client, cfg: &FetchConfig) -> Result<Vec<RawTable>> {
    let html = fetch_page(client, &cfg.url, cfg.max_attempts).await?;
    let tables = parse_html_tables(&html);
    info!(tables = tables.len(), "parsed html tables");
    Ok(tables)
}

/// Fetch the configured table from the book list and log its first rows.
#[tracing::instrument(level = "info", skip(cfg), fields(url = %cfg.url, table = cfg.table_index))]
pub async fn fetch_book_table(cfg: &FetchConfig) -> Result<RawTable> {
    let client = build_client(cfg)?;
    let tables = fetch_html_tables(&client, cfg).await?;
    let books = select_table(tables, cfg.table_index)?;

    info!(
        rows = books.num_rows(),
        columns = ?books.headers,
        "selected book table"
    );
    for row in books.head(PREVIEW_ROWS).rows {
        info!(row = ?row, "book");
    }
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::tests::init_test_logging;
    use std::io;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const PAGE: &str = "<html><body>\
        <table><tr><th>a</th></tr><tr><td>1</td></tr></table>\
        <table><tr><th>Title</th><th>Year</th></tr><tr><td>Dr. No</td><td>1958</td></tr></table>\
        </body></html>";

    /// Serve `responses` in order on a local port, one per connection, then
    /// repeat the last one.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[n.min(responses.len() - 1)];

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(k) => buf.extend_from_slice(&chunk[..k]),
                    }
                }

                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        let url = Url::parse(&format!("http://{}/books", addr)).unwrap();
        (url, hits)
    }

    /// Log sink for one test; every clone appends to the same buffer.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber scoped to this thread and return what it logged.
    fn logged_while<T>(f: impl FnOnce() -> T) -> (T, String) {
        let log = CapturedLog::default();
        let sink = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        (out, text)
    }

    fn local_config(url: Url) -> FetchConfig {
        FetchConfig {
            url,
            timeout: Duration::from_secs(5),
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn fetches_the_configured_table() {
        init_test_logging();
        let (url, hits) = serve(vec![(200, PAGE)]).await;
        let books = fetch_book_table(&local_config(url)).await.unwrap();
        assert_eq!(books.headers, vec!["Title", "Year"]);
        assert_eq!(books.rows, vec![vec!["Dr. No".to_string(), "1958".to_string()]]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let (url, hits) = serve(vec![(503, ""), (200, PAGE)]).await;
        let cfg = local_config(url);
        let client = build_client(&cfg).unwrap();
        let tables = fetch_html_tables(&client, &cfg).await.unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn not_found_fails_without_retry() {
        let (url, hits) = serve(vec![(404, "gone")]).await;
        let cfg = local_config(url);
        let client = build_client(&cfg).unwrap();
        let err = fetch_page(&client, &cfg.url, 3).await.unwrap_err();
        match err {
            PipelineError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempts_stop_at_the_configured_total() {
        let (url, hits) = serve(vec![(503, "")]).await;
        let cfg = local_config(url);
        let client = build_client(&cfg).unwrap();
        let err = fetch_page(&client, &cfg.url, 2).await.unwrap_err();
        match err {
            PipelineError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn insecure_client_builds_and_warns() {
        let cfg = FetchConfig {
            accept_invalid_certs: true,
            ..FetchConfig::default()
        };
        let (client, log) = logged_while(|| build_client(&cfg));
        assert!(client.is_ok());
        assert!(log.contains("WARN"), "{log}");
        assert!(log.contains("TLS certificate verification is disabled"), "{log}");
        assert!(log.contains("en.wikipedia.org"), "{log}");
    }

    #[test]
    fn verifying_client_does_not_warn() {
        let (client, log) = logged_while(|| build_client(&FetchConfig::default()));
        assert!(client.is_ok());
        assert!(!log.contains("TLS certificate verification"), "{log}");
    }

    #[tokio::test]
    async fn missing_table_index_is_an_error() {
        let (url, _) = serve(vec![(200, PAGE)]).await;
        let cfg = FetchConfig {
            table_index: 7,
            ..local_config(url)
        };
        let err = fetch_book_table(&cfg).await.unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }
}
