// src/services/crawler.rs

//! Catalogue crawler service.
//!
//! Walks department listing pages, commits every parsed course to the
//! shared store and follows department links breadth-first. Each full crawl
//! is one session with its own visited-set.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{CrawlOutcome, CrawlerConfig};
use crate::services::parser::{CourseParser, ParsedPage};
use crate::storage::CourseStore;
use crate::utils::http::PageFetcher;
use crate::utils::{normalize_department, semester_endpoint, subject_url};

/// Department tokens already scheduled in one crawl session.
#[derive(Debug, Default)]
pub struct VisitedSet {
    tokens: HashSet<String>,
}

impl VisitedSet {
    /// Mark a token visited. Returns `true` only the first time.
    pub fn insert(&mut self, token: &str) -> bool {
        self.tokens.insert(normalize_department(token))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&normalize_department(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Crawls the catalogue of the active semester into a [`CourseStore`].
pub struct CatalogueCrawler {
    fetcher: Arc<dyn PageFetcher>,
    parser: CourseParser,
    store: Arc<CourseStore>,
    config: CrawlerConfig,
    endpoint: RwLock<String>,
    session: Mutex<()>,
}

impl CatalogueCrawler {
    /// Create a crawler rooted at `{base_url}/{semester}`.
    pub fn new(
        config: &CrawlerConfig,
        parser: CourseParser,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<CourseStore>,
        semester: &str,
    ) -> Self {
        Self {
            fetcher,
            parser,
            store,
            config: config.clone(),
            endpoint: RwLock::new(semester_endpoint(&config.base_url, semester)),
            session: Mutex::new(()),
        }
    }

    /// Catalogue root currently crawled.
    pub fn endpoint(&self) -> String {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point later crawls at another semester.
    pub fn set_semester(&self, semester: &str) {
        let endpoint = semester_endpoint(&self.config.base_url, semester);
        log::info!("Catalogue endpoint set to {endpoint}");
        *self.endpoint.write().unwrap_or_else(PoisonError::into_inner) = endpoint;
    }

    pub fn store(&self) -> &Arc<CourseStore> {
        &self.store
    }

    /// Crawl a single department page without following links.
    pub async fn crawl_department(&self, department: &str) -> Result<CrawlOutcome> {
        let department = normalize_department(department);
        let url = subject_url(&self.endpoint(), &department);
        log::info!("Crawling courses for {department}");

        match self.fetch_page(&url).await {
            Ok(page) => {
                let (outcome, _) = self.commit(&department, page);
                Ok(outcome)
            }
            Err(e) => {
                log::error!("Failed to crawl {department}: {e}");
                Err(e)
            }
        }
    }

    /// Crawl every department reachable from the seed department.
    ///
    /// Only one full crawl runs at a time; later callers wait for the
    /// running session and then start their own.
    pub async fn crawl_all(&self) -> CrawlOutcome {
        let _session = self.session.lock().await;

        let endpoint = self.endpoint();
        let concurrency = self.config.max_concurrent.max(1);
        let limit = self.config.max_departments.max(1);

        let mut visited = VisitedSet::default();
        let mut queue = VecDeque::new();
        let seed = normalize_department(&self.config.seed_department);
        visited.insert(&seed);
        queue.push_back(seed);

        let mut outcome = CrawlOutcome::default();
        let mut limit_reached = false;

        log::info!("Starting full crawl of {endpoint}");

        while !queue.is_empty() {
            let wave: Vec<String> = queue.drain(..).collect();
            let mut pages = stream::iter(wave)
                .map(|department| {
                    let url = subject_url(&endpoint, &department);
                    async move {
                        let result = self.fetch_page(&url).await;
                        (department, result)
                    }
                })
                .buffered(concurrency);

            while let Some((department, result)) = pages.next().await {
                let page = match result {
                    Ok(page) => page,
                    Err(e) => {
                        outcome.page_failures += 1;
                        log::warn!("Skipping department {department}: {e}");
                        continue;
                    }
                };

                let (committed, links) = self.commit(&department, page);
                outcome.absorb(committed);

                for token in links {
                    if visited.contains(&token) {
                        continue;
                    }
                    if visited.len() >= limit {
                        if !limit_reached {
                            log::warn!(
                                "Department limit of {limit} reached; not following {token} and beyond"
                            );
                            limit_reached = true;
                        }
                        continue;
                    }
                    if visited.insert(&token) {
                        log::info!("Traversing courses for {token}");
                        queue.push_back(token);
                    }
                }
            }
        }

        log::info!(
            "Crawl complete: {} departments, {} courses stored, {} pages failed, {} fragments skipped",
            outcome.departments_visited,
            outcome.courses_stored,
            outcome.page_failures,
            outcome.parse_failures
        );

        outcome
    }

    async fn fetch_page(&self, url: &str) -> Result<ParsedPage> {
        let html = self.fetcher.fetch(url).await?;
        log::debug!("Accessed: {url}");
        Ok(self.parser.parse_page(&html))
    }

    /// Store parsed courses and hand back the page's tally and linked
    /// department tokens.
    fn commit(&self, department: &str, page: ParsedPage) -> (CrawlOutcome, Vec<String>) {
        let mut outcome = CrawlOutcome {
            departments_visited: 1,
            ..CrawlOutcome::default()
        };

        for result in page.courses {
            match result {
                Ok(course) => {
                    self.store.put(course);
                    outcome.courses_stored += 1;
                }
                Err(e) => {
                    outcome.parse_failures += 1;
                    log::warn!("Skipping course fragment on {department}: {e}");
                }
            }
        }

        (outcome, page.departments)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::ParserConfig;

    pub(crate) const BASE: &str = "https://catalogue.test/wcq/cgi-bin";

    /// Serves canned pages and records every requested URL.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pages: HashMap<String, String>,
        hits: StdMutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub(crate) fn with_page(mut self, semester: &str, department: &str, html: String) -> Self {
            self.pages
                .insert(format!("{BASE}/{semester}/subject/{department}"), html);
            self
        }

        pub(crate) fn hits(&self) -> Vec<String> {
            self.hits.lock().unwrap().clone()
        }

        fn hit_count(&self, department: &str) -> usize {
            let suffix = format!("/subject/{department}");
            self.hits().iter().filter(|u| u.ends_with(&suffix)).count()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.hits.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "unexpected status 404 Not Found"))
        }
    }

    pub(crate) fn course_html(header: &str) -> String {
        format!(
            r#"<div class="course"><h2>{header}</h2><table>
                <tr class="newsect"><td>L1 (1001)</td><td>Mo</td><td>Rm 1</td>
                <td><a>DOE, Jane</a></td><td></td></tr>
            </table></div>"#
        )
    }

    pub(crate) fn page_html(links: &[(&str, &str)], courses: &[&str]) -> String {
        let links: String = links
            .iter()
            .map(|(class, token)| format!(r#"<a class="{class}" href="/s/{token}">{token}</a>"#))
            .collect();
        let courses: String = courses.iter().map(|h| course_html(h)).collect();
        format!("<html><body><div id=\"nav\">{links}</div>{courses}</body></html>")
    }

    pub(crate) fn crawler_with(
        fetcher: Arc<FakeFetcher>,
        config: CrawlerConfig,
    ) -> CatalogueCrawler {
        let parser = CourseParser::new(&ParserConfig::default()).unwrap();
        CatalogueCrawler::new(
            &config,
            parser,
            fetcher,
            Arc::new(CourseStore::new()),
            "2510",
        )
    }

    pub(crate) fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            base_url: BASE.to_string(),
            ..CrawlerConfig::default()
        }
    }

    fn two_department_catalogue() -> FakeFetcher {
        FakeFetcher::default()
            .with_page(
                "2510",
                "COMP",
                page_html(
                    &[("ug", "COMP"), ("ug", "MATH"), ("pg", "MATH")],
                    &[
                        "COMP 1021 - Introduction to Computer Science (3 units)",
                        "COMP 2011 - Programming with C++ (4 units)",
                    ],
                ),
            )
            .with_page(
                "2510",
                "MATH",
                page_html(
                    &[("ug", "comp"), ("pg", "MATH")],
                    &["MATH 1003 - Calculus and Linear Algebra (3 units)"],
                ),
            )
    }

    #[test]
    fn test_visited_set_is_case_insensitive() {
        let mut visited = VisitedSet::default();
        assert!(visited.is_empty());
        assert!(visited.insert("COMP"));
        assert!(!visited.insert(" comp "));
        assert!(visited.contains("Comp"));
        assert_eq!(visited.len(), 1);
    }

    #[tokio::test]
    async fn test_full_crawl_visits_each_department_once() {
        let fetcher = Arc::new(two_department_catalogue());
        let crawler = crawler_with(Arc::clone(&fetcher), test_config());

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.departments_visited, 2);
        assert_eq!(outcome.courses_stored, 3);
        assert_eq!(outcome.page_failures, 0);
        assert_eq!(crawler.store().len(), 3);
        assert_eq!(fetcher.hit_count("COMP"), 1);
        assert_eq!(fetcher.hit_count("MATH"), 1);
        assert_eq!(fetcher.hits().len(), 2);

        let course = crawler.store().get("COMP1021").unwrap();
        assert_eq!(course.title, "Introduction to Computer Science");
        assert_eq!(course.instructors["DOE, Jane"], vec!["L1"]);
    }

    #[tokio::test]
    async fn test_repeated_full_crawls_start_fresh_sessions() {
        let fetcher = Arc::new(two_department_catalogue());
        let crawler = crawler_with(Arc::clone(&fetcher), test_config());

        crawler.crawl_all().await;
        let second = crawler.crawl_all().await;

        assert_eq!(second.departments_visited, 2);
        assert_eq!(fetcher.hits().len(), 4);
        assert_eq!(crawler.store().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_branch_does_not_stop_the_crawl() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .with_page(
                    "2510",
                    "COMP",
                    page_html(
                        &[("ug", "GONE"), ("pg", "MATH")],
                        &["COMP 1021 - Intro (3 units)", "COMP 1022 - Broken heading"],
                    ),
                )
                .with_page(
                    "2510",
                    "MATH",
                    page_html(&[], &["MATH 1003 - Calculus (3 units)"]),
                ),
        );
        let crawler = crawler_with(Arc::clone(&fetcher), test_config());

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.departments_visited, 2);
        assert_eq!(outcome.page_failures, 1);
        assert_eq!(outcome.parse_failures, 1);
        assert_eq!(outcome.courses_stored, 2);
        assert!(crawler.store().get("MATH1003").is_some());
    }

    #[tokio::test]
    async fn test_department_limit_bounds_traversal() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .with_page(
                    "2510",
                    "COMP",
                    page_html(&[("ug", "AAAA"), ("ug", "BBBB"), ("ug", "CCCC")], &[]),
                )
                .with_page("2510", "AAAA", page_html(&[], &[]))
                .with_page("2510", "BBBB", page_html(&[], &[]))
                .with_page("2510", "CCCC", page_html(&[], &[])),
        );
        let config = CrawlerConfig {
            max_departments: 2,
            ..test_config()
        };
        let crawler = crawler_with(Arc::clone(&fetcher), config);

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.departments_visited, 2);
        assert_eq!(fetcher.hit_count("AAAA"), 1);
        assert_eq!(fetcher.hit_count("BBBB"), 0);
        assert_eq!(fetcher.hit_count("CCCC"), 0);
    }

    #[tokio::test]
    async fn test_single_department_does_not_follow_links() {
        let fetcher = Arc::new(two_department_catalogue());
        let crawler = crawler_with(Arc::clone(&fetcher), test_config());

        let outcome = crawler.crawl_department("comp").await.unwrap();

        assert_eq!(outcome.departments_visited, 1);
        assert_eq!(outcome.courses_stored, 2);
        assert_eq!(fetcher.hits().len(), 1);
        assert!(crawler.store().get("MATH1003").is_none());
    }

    #[tokio::test]
    async fn test_single_department_fetch_failure_is_reported() {
        let fetcher = Arc::new(FakeFetcher::default());
        let crawler = crawler_with(fetcher, test_config());

        let err = crawler.crawl_department("NOPE").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
        assert!(crawler.store().is_empty());
    }

    #[tokio::test]
    async fn test_set_semester_changes_crawl_target() {
        let fetcher = Arc::new(FakeFetcher::default().with_page(
            "2520",
            "COMP",
            page_html(&[], &["COMP 1021 - Intro (3 units)"]),
        ));
        let crawler = crawler_with(Arc::clone(&fetcher), test_config());

        crawler.set_semester("2520");
        assert_eq!(crawler.endpoint(), format!("{BASE}/2520"));

        crawler.crawl_department("COMP").await.unwrap();
        assert_eq!(fetcher.hits(), vec![format!("{BASE}/2520/subject/COMP")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_store_stays_consistent_under_concurrent_crawls_and_reads() {
        let fetcher = Arc::new(two_department_catalogue());
        let crawler = Arc::new(crawler_with(fetcher, test_config()));

        let mut handles = Vec::new();
        for i in 0..4 {
            let crawler = Arc::clone(&crawler);
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    crawler.crawl_all().await;
                } else {
                    let _ = crawler.crawl_department("MATH").await;
                }
            }));
        }
        for _ in 0..4 {
            let crawler = Arc::clone(&crawler);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let listed = crawler.store().list();
                    assert!(listed.len() <= 3);
                    let _ = crawler.store().get("COMP1021");
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(crawler.store().len(), 3);
    }
}
