use async_trait::async_trait;
use rankcrawl::config::{CrawlConfig, Patterns};
use rankcrawl::crawler::{run_crawl, Crawler, FetchError, PageFetcher, PageMetadata};
use rankcrawl::output::{open_append, RunStatus, RECORD_SEPARATOR};
use rankcrawl::storage::{SqliteStore, SITES_NAMESPACE};
use rankcrawl::CrawlerError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Serves canned bodies per domain; unknown domains fail
#[derive(Default)]
struct ScriptedFetcher {
    bodies: HashMap<String, String>,
    delay: Option<Duration>,
    /// Domains answered immediately even when a delay is set
    instant: Vec<String>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(bodies: &[(&str, &str)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(domain, body)| (domain.to_string(), body.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn with_instant(mut self, domains: &[&str]) -> Self {
        self.instant = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    fn fetched(&self) -> Vec<String> {
        let mut fetched = self.fetched.lock().unwrap().clone();
        fetched.sort();
        fetched
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, uri: &str, _timeout: Duration) -> Result<PageMetadata, FetchError> {
        self.fetched.lock().unwrap().push(uri.to_string());
        if let Some(delay) = self.delay {
            if !self.instant.iter().any(|d| d == uri) {
                tokio::time::sleep(delay).await;
            }
        }

        match self.bodies.get(uri) {
            Some(body) => Ok(PageMetadata {
                url: format!("http://{}/", uri),
                title: format!("{} home", uri),
                description: "A test site".to_string(),
                language: "en".to_string(),
                body: body.as_bytes().to_vec(),
            }),
            None => Err(FetchError::Status {
                url: uri.to_string(),
                status: 502,
            }),
        }
    }
}

fn create_store(dir: &TempDir, csv: &str) -> SqliteStore {
    let mut store = SqliteStore::open(&dir.path().join("sites.db")).expect("Failed to open store");
    store
        .import_ranks(SITES_NAMESPACE, csv.as_bytes())
        .expect("Failed to import ranks");
    store
}

fn shop_patterns() -> Patterns {
    [("shop", "add-to-cart")].into_iter().collect()
}

fn read_records(path: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    content
        .split(&format!("{}\n\n", RECORD_SEPARATOR))
        .filter(|record| !record.is_empty())
        .map(|record| record.to_string())
        .collect()
}

#[tokio::test]
async fn test_skip_uses_lexicographic_keys() {
    let dir = TempDir::new().unwrap();
    let store = create_store(&dir, "0,a.com\n1,b.com\n10,c.com\n");
    let fetcher = Arc::new(ScriptedFetcher::new(&[]));
    let crawler = Crawler::new(
        store,
        CrawlConfig::new(2, shop_patterns()),
        Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
    );

    let summary = run_crawl(&crawler, 1, std::io::sink(), std::future::pending::<()>())
        .await
        .expect("Crawl failed");

    assert_eq!(fetcher.fetched(), vec!["b.com", "c.com"]);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.errors, 2);
}

#[tokio::test]
async fn test_match_and_no_match_routing() {
    let dir = TempDir::new().unwrap();
    let store = create_store(&dir, "1,a.com\n2,b.com\n3,broken.com\n");
    let fetcher = ScriptedFetcher::new(&[
        ("a.com", r#"<button class="add-to-cart">Buy</button>"#),
        ("b.com", "<p>just a blog</p>"),
    ]);
    let crawler = Crawler::new(store, CrawlConfig::new(4, shop_patterns()), Arc::new(fetcher));

    let out_path = dir.path().join("crawled.txt");
    let out = open_append(&out_path).unwrap();

    let summary = run_crawl(&crawler, 0, out, std::future::pending::<()>())
        .await
        .expect("Crawl failed");

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.no_match, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.written, 1);

    let records = read_records(&out_path);
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0],
        "URL: http://a.com/\n\
         Patterns: shop\n\
         Title: a.com home\n\
         Description: A test site\n\
         Language: EN\n"
    );
}

#[tokio::test]
async fn test_output_file_is_appended() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("crawled.txt");

    for _ in 0..2 {
        let store = create_store(&dir, "1,a.com\n");
        let fetcher = ScriptedFetcher::new(&[("a.com", "add-to-cart")]);
        let crawler = Crawler::new(store, CrawlConfig::new(1, shop_patterns()), Arc::new(fetcher));
        run_crawl(&crawler, 0, open_append(&out_path).unwrap(), std::future::pending::<()>())
            .await
            .expect("Crawl failed");
    }

    assert_eq!(read_records(&out_path).len(), 2);
}

#[tokio::test]
async fn test_counts_are_identical_across_job_counts() {
    let mut csv = String::new();
    let mut bodies = Vec::new();
    for rank in 0..120 {
        csv.push_str(&format!("{},site{}.com\n", rank, rank));
        match rank % 4 {
            0 => bodies.push((format!("site{}.com", rank), "add-to-cart".to_string())),
            1 => bodies.push((format!("site{}.com", rank), "nothing".to_string())),
            _ => {}
        }
    }
    let bodies: Vec<(&str, &str)> = bodies
        .iter()
        .map(|(domain, body)| (domain.as_str(), body.as_str()))
        .collect();

    let mut outcomes = Vec::new();
    for jobs in [1, 8, 64] {
        let dir = TempDir::new().unwrap();
        let store = create_store(&dir, &csv);
        let fetcher = Arc::new(ScriptedFetcher::new(&bodies));
        let crawler = Crawler::new(
            store,
            CrawlConfig::new(jobs, shop_patterns()),
            Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
        );

        let summary = run_crawl(&crawler, 0, std::io::sink(), std::future::pending::<()>())
            .await
            .expect("Crawl failed");

        assert_eq!(fetcher.fetched().len(), 120, "jobs = {}", jobs);
        assert_eq!(
            summary.matched + summary.errors + summary.no_match,
            summary.dispatched
        );
        outcomes.push((summary.matched, summary.errors, summary.no_match));
    }

    assert_eq!(outcomes, vec![(30, 60, 30); 3]);
}

#[tokio::test]
async fn test_interrupt_stops_and_drains() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::new();
    let mut bodies = Vec::new();
    for rank in 0..200 {
        csv.push_str(&format!("{},site{}.com\n", rank, rank));
        bodies.push(format!("site{}.com", rank));
    }
    let store = create_store(&dir, &csv);
    let bodies: Vec<(&str, &str)> = bodies.iter().map(|d| (d.as_str(), "add-to-cart")).collect();
    let fetcher = Arc::new(ScriptedFetcher::new(&bodies).with_delay(Duration::from_millis(20)));
    let crawler = Crawler::new(
        store,
        CrawlConfig::new(4, shop_patterns()),
        Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
    );

    let out_path = dir.path().join("crawled.txt");
    let shutdown = tokio::time::sleep(Duration::from_millis(100));

    let summary = run_crawl(&crawler, 0, open_append(&out_path).unwrap(), shutdown)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.status, RunStatus::Interrupted);
    assert!(summary.processed < 200, "processed {}", summary.processed);
    assert!(fetcher.fetched().len() as u64 >= summary.processed);
    assert_eq!(summary.dispatched, summary.processed + summary.skipped);
    assert_eq!(summary.matched, summary.written);

    // Nothing is appended once the run has returned
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(read_records(&out_path).len() as u64, summary.written);
}

#[tokio::test]
async fn test_no_records_appended_after_interrupt() {
    let dir = TempDir::new().unwrap();
    let mut csv = String::new();
    for rank in 0..50 {
        csv.push_str(&format!("{},site{}.com\n", rank, rank));
    }
    let store = create_store(&dir, &csv);
    let bodies: Vec<(String, &str)> = (0..50)
        .map(|rank| (format!("site{}.com", rank), "add-to-cart"))
        .collect();
    let bodies: Vec<(&str, &str)> = bodies.iter().map(|(d, b)| (d.as_str(), *b)).collect();

    // Keys "0".."3" sort first and answer at once; every later fetch is
    // still in flight when the signal fires.
    let fetcher = Arc::new(
        ScriptedFetcher::new(&bodies)
            .with_delay(Duration::from_millis(400))
            .with_instant(&["site0.com", "site1.com", "site10.com", "site11.com"]),
    );
    let crawler = Crawler::new(
        store,
        CrawlConfig::new(4, shop_patterns()),
        Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
    );

    let out_path = dir.path().join("crawled.txt");
    let at_signal = Arc::new(AtomicUsize::new(usize::MAX));
    let shutdown = {
        let out_path = out_path.clone();
        let at_signal = Arc::clone(&at_signal);
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            at_signal.store(read_records(&out_path).len(), Ordering::SeqCst);
        }
    };

    let summary = run_crawl(&crawler, 0, open_append(&out_path).unwrap(), shutdown)
        .await
        .expect("Crawl failed");

    let records_at_signal = at_signal.load(Ordering::SeqCst);
    assert_eq!(summary.status, RunStatus::Interrupted);
    assert_eq!(records_at_signal, 4);
    assert_eq!(read_records(&out_path).len(), records_at_signal);
    assert_eq!(summary.written, 4);
    assert_eq!(summary.matched, 4);
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.dispatched, summary.processed + summary.skipped);
}

#[tokio::test]
async fn test_missing_namespace_aborts_before_crawling() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&dir.path().join("empty.db")).unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(&[]));
    let crawler = Crawler::new(
        store,
        CrawlConfig::new(2, shop_patterns()),
        Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
    );

    let result = run_crawl(&crawler, 0, std::io::sink(), std::future::pending::<()>()).await;

    assert!(matches!(result, Err(CrawlerError::MissingNamespace(_))));
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test]
async fn test_empty_patterns_yield_no_results_and_no_errors() {
    let dir = TempDir::new().unwrap();
    let store = create_store(&dir, "1,a.com\n2,b.com\n");
    let fetcher = ScriptedFetcher::new(&[("a.com", "add-to-cart"), ("b.com", "blog")]);
    let crawler = Crawler::new(store, CrawlConfig::new(2, Patterns::new()), Arc::new(fetcher));

    let summary = run_crawl(&crawler, 0, std::io::sink(), std::future::pending::<()>())
        .await
        .expect("Crawl failed");

    assert_eq!(summary.no_match, 2);
    assert_eq!(summary.matched, 0);
    assert_eq!(summary.errors, 0);
}
