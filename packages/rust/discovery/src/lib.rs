//! Recursive sitemap resolution.
//!
//! Starting from one sitemap URL, fetches every nested sitemap it references
//! (any `<loc>` ending in `.xml`) and collects the remaining locations as leaf
//! URLs. Each sitemap location is fetched at most once per run: it is marked
//! processed *before* the request goes out, so self-references and cycles
//! terminate. Fetches are strictly sequential.
//!
//! Failures never abort the traversal. A transport error, an empty body or
//! malformed XML ends that one branch and is recorded in the [`ResolveReport`].

mod parser;

use std::time::Duration;

use linkshowcase_shared::{LinkShowcaseError, ProcessedSet, Result, UrlSet};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

pub use parser::{Location, extract_locations};

/// Maximum number of redirects to follow per sitemap request.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for each sitemap request.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default maximum nesting depth (the root sitemap is depth 0).
const DEFAULT_MAX_DEPTH: usize = 16;

/// User-Agent string for sitemap requests.
const USER_AGENT: &str = concat!("linkshowcase/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Configuration for the resolver.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Timeout for each HTTP request.
    pub timeout: Duration,
    /// Sitemaps nested deeper than this are skipped.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Why a sitemap branch was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection error, timeout, non-2xx status, or unreadable body.
    Transport,
    /// The response body was empty.
    EmptyBody,
    /// The body was not well-formed XML.
    Malformed,
    /// The sitemap was nested beyond the configured maximum depth.
    TooDeep,
}

/// A sitemap branch that produced no locations.
#[derive(Debug, Clone)]
pub struct SitemapFailure {
    pub sitemap_url: String,
    pub kind: FailureKind,
    pub message: String,
}

/// The accumulators threaded through the traversal.
#[derive(Debug, Default)]
pub struct ResolveState {
    /// Leaf URLs found so far.
    pub urls: UrlSet,
    /// Sitemap locations already fetched (or being fetched).
    pub processed: ProcessedSet,
    /// Branches that were abandoned.
    pub failures: Vec<SitemapFailure>,
}

/// Outcome of a full resolution run.
pub type ResolveReport = ResolveState;

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Sequential, cycle-safe sitemap tree walker.
pub struct SitemapResolver {
    client: Client,
    opts: ResolveOptions,
}

impl SitemapResolver {
    /// Create a resolver with its own HTTP client.
    pub fn new(opts: ResolveOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(opts.timeout)
            .build()
            .map_err(|e| {
                LinkShowcaseError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, opts })
    }

    /// Resolve the whole tree below `sitemap_url` into a fresh report.
    #[instrument(skip(self))]
    pub async fn resolve(&self, sitemap_url: &str) -> ResolveReport {
        let mut state = ResolveState::default();
        self.resolve_into(sitemap_url, &mut state).await;

        info!(
            urls = state.urls.len(),
            sitemaps = state.processed.len(),
            failures = state.failures.len(),
            "sitemap resolution complete"
        );

        state
    }

    /// Resolve `sitemap_url` into existing accumulators.
    ///
    /// Sitemaps already present in `state.processed` are not fetched again,
    /// so several roots can share one state.
    pub async fn resolve_into(&self, sitemap_url: &str, state: &mut ResolveState) {
        self.visit(sitemap_url, 0, state).await;
    }

    async fn visit(&self, sitemap_url: &str, depth: usize, state: &mut ResolveState) {
        if state.processed.contains(sitemap_url) {
            info!(sitemap = %sitemap_url, "skipping already processed sitemap");
            return;
        }

        if depth > self.opts.max_depth {
            warn!(
                sitemap = %sitemap_url,
                depth,
                max_depth = self.opts.max_depth,
                "sitemap nested too deeply, skipping"
            );
            state.failures.push(SitemapFailure {
                sitemap_url: sitemap_url.to_string(),
                kind: FailureKind::TooDeep,
                message: format!("depth {depth} exceeds maximum {}", self.opts.max_depth),
            });
            return;
        }

        info!(sitemap = %sitemap_url, depth, "processing sitemap");
        state.processed.insert(sitemap_url.to_string());

        let body = match self.fetch(sitemap_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(sitemap = %sitemap_url, error = %e, "error fetching sitemap");
                state.failures.push(SitemapFailure {
                    sitemap_url: sitemap_url.to_string(),
                    kind: FailureKind::Transport,
                    message: e.to_string(),
                });
                return;
            }
        };

        let body = body.trim();
        if body.is_empty() {
            warn!(sitemap = %sitemap_url, "sitemap is empty");
            state.failures.push(SitemapFailure {
                sitemap_url: sitemap_url.to_string(),
                kind: FailureKind::EmptyBody,
                message: "empty response body".into(),
            });
            return;
        }

        let locations = match extract_locations(body) {
            Ok(locations) => locations,
            Err(e) => {
                warn!(sitemap = %sitemap_url, error = %e, "error parsing sitemap XML");
                state.failures.push(SitemapFailure {
                    sitemap_url: sitemap_url.to_string(),
                    kind: FailureKind::Malformed,
                    message: e.to_string(),
                });
                return;
            }
        };

        debug!(sitemap = %sitemap_url, locations = locations.len(), "sitemap parsed");

        for loc in locations {
            match Location::classify(loc) {
                Location::Sitemap(child) => {
                    Box::pin(self.visit(&child, depth + 1, state)).await;
                }
                Location::Leaf(url) => {
                    state.urls.insert(url);
                }
            }
        }
    }

    /// GET a sitemap and return its body, treating non-2xx as an error.
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LinkShowcaseError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkShowcaseError::network(url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LinkShowcaseError::network(url, format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urlset(locs: &[String]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for loc in locs {
            xml.push_str(&format!("  <url><loc>{loc}</loc></url>\n"));
        }
        xml.push_str("</urlset>\n");
        xml
    }

    fn index(locs: &[String]) -> String {
        let mut xml = String::from(
            "<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for loc in locs {
            xml.push_str(&format!("  <sitemap><loc>{loc}</loc></sitemap>\n"));
        }
        xml.push_str("</sitemapindex>\n");
        xml
    }

    async fn serve(server: &MockServer, route: &str, body: String, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }

    /// Formatted log output collected by a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Install a subscriber with the CLI's default filter for the current thread.
    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("linkshowcase=info"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    fn resolver() -> SitemapResolver {
        SitemapResolver::new(ResolveOptions {
            timeout: Duration::from_secs(2),
            ..ResolveOptions::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn flat_urlset_collects_leaves() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(
            &server,
            "/sitemap.xml",
            urlset(&[format!("{base}/b"), format!("{base}/a"), format!("{base}/a")]),
            1,
        )
        .await;

        let report = resolver().resolve(&format!("{base}/sitemap.xml")).await;

        let urls: Vec<_> = report.urls.iter().cloned().collect();
        assert_eq!(urls, vec![format!("{base}/a"), format!("{base}/b")]);
        assert_eq!(report.processed.len(), 1);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn nested_xml_locations_are_never_leaves() {
        let server = MockServer::start().await;
        let base = server.uri();

        serve(&server, "/sitemap.xml", index(&[format!("{base}/level1.xml")]), 1).await;
        serve(
            &server,
            "/level1.xml",
            index(&[format!("{base}/level2.xml")]),
            1,
        )
        .await;
        serve(
            &server,
            "/level2.xml",
            urlset(&[format!("{base}/level3.xml"), format!("{base}/page-2")]),
            1,
        )
        .await;
        serve(&server, "/level3.xml", urlset(&[format!("{base}/deep-page")]), 1).await;

        let report = resolver().resolve(&format!("{base}/sitemap.xml")).await;

        assert_eq!(report.urls.len(), 2);
        assert!(report.urls.contains(&format!("{base}/deep-page")));
        assert!(report.urls.iter().all(|u| !u.ends_with(".xml")));
        assert_eq!(report.processed.len(), 4);
    }

    #[tokio::test]
    async fn shared_child_is_fetched_once() {
        let server = MockServer::start().await;
        let base = server.uri();

        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/a.xml"), format!("{base}/b.xml")]),
            1,
        )
        .await;
        serve(&server, "/a.xml", index(&[format!("{base}/shared.xml")]), 1).await;
        serve(&server, "/b.xml", index(&[format!("{base}/shared.xml")]), 1).await;
        serve(&server, "/shared.xml", urlset(&[format!("{base}/page")]), 1).await;

        let report = resolver().resolve(&format!("{base}/sitemap.xml")).await;

        assert_eq!(report.processed.len(), 4);
        assert_eq!(report.urls.len(), 1);
        // wiremock verifies the `.expect(1)` counts when the server drops
    }

    #[tokio::test]
    async fn cycles_terminate() {
        let server = MockServer::start().await;
        let base = server.uri();

        serve(
            &server,
            "/sitemap.xml",
            index(&[format!("{base}/sitemap.xml"), format!("{base}/child.xml")]),
            1,
        )
        .await;
        serve(
            &server,
            "/child.xml",
            urlset(&[format!("{base}/sitemap.xml"), format!("{base}/leaf")]),
            1,
        )
        .await;

        let (logs, _guard) = capture_logs();
        let report = resolver().resolve(&format!("{base}/sitemap.xml")).await;

        assert_eq!(report.processed.len(), 2);
        assert_eq!(report.urls.len(), 1);
        assert!(report.failures.is_empty());

        // Both back-references to the root are reported at the default level.
        let output = logs.contents();
        assert_eq!(
            output.matches("skipping already processed sitemap").count(),
            2,
            "{output}"
        );
    }

    #[tokio::test]
    async fn failing_branches_do_not_stop_siblings() {
        let server = MockServer::start().await;
        let base = server.uri();

        serve(
            &server,
            "/sitemap.xml",
            index(&[
                format!("{base}/missing.xml"),
                format!("{base}/broken.xml"),
                format!("{base}/empty.xml"),
                format!("{base}/good.xml"),
            ]),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/missing.xml"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        serve(
            &server,
            "/broken.xml",
            "<urlset><url><loc>https://x.example/</url>".into(),
            1,
        )
        .await;
        serve(&server, "/empty.xml", "  \n ".into(), 1).await;
        serve(&server, "/good.xml", urlset(&[format!("{base}/ok")]), 1).await;

        let (logs, _guard) = capture_logs();
        let report = resolver().resolve(&format!("{base}/sitemap.xml")).await;

        assert_eq!(report.urls.len(), 1);
        assert!(report.urls.contains(&format!("{base}/ok")));
        assert_eq!(report.processed.len(), 5);

        let kinds: Vec<_> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::Transport,
                FailureKind::Malformed,
                FailureKind::EmptyBody
            ]
        );
        assert!(report.failures[0].message.contains("404"));

        // Every abandoned branch is a warning.
        let output = logs.contents();
        for message in [
            "error fetching sitemap",
            "error parsing sitemap XML",
            "sitemap is empty",
        ] {
            assert!(
                output
                    .lines()
                    .any(|line| line.contains("WARN") && line.contains(message)),
                "{message}: {output}"
            );
        }
    }

    #[tokio::test]
    async fn unreachable_root_yields_empty_report() {
        let resolver = resolver();
        // Port 9 (discard) is not listening on loopback in test environments.
        let report = resolver.resolve("http://127.0.0.1:9/sitemap.xml").await;

        assert!(report.urls.is_empty());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Transport);
    }

    #[tokio::test]
    async fn depth_guard_stops_descent() {
        let server = MockServer::start().await;
        let base = server.uri();

        serve(&server, "/sitemap.xml", index(&[format!("{base}/one.xml")]), 1).await;
        serve(&server, "/one.xml", index(&[format!("{base}/two.xml")]), 1).await;
        serve(&server, "/two.xml", urlset(&[format!("{base}/never")]), 0).await;

        let resolver = SitemapResolver::new(ResolveOptions {
            timeout: Duration::from_secs(2),
            max_depth: 1,
        })
        .unwrap();
        let report = resolver.resolve(&format!("{base}/sitemap.xml")).await;

        assert!(report.urls.is_empty());
        assert!(!report.processed.contains(&format!("{base}/two.xml")));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::TooDeep);
    }

    #[tokio::test]
    async fn resolve_into_skips_already_processed_roots() {
        let server = MockServer::start().await;
        let base = server.uri();
        serve(&server, "/sitemap.xml", urlset(&[format!("{base}/page")]), 1).await;

        let resolver = resolver();
        let root = format!("{base}/sitemap.xml");
        let mut state = ResolveState::default();
        resolver.resolve_into(&root, &mut state).await;
        resolver.resolve_into(&root, &mut state).await;

        assert_eq!(state.urls.len(), 1);
        assert_eq!(state.processed.len(), 1);
    }
}
