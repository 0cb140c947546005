use pagelens::config::FetcherConfig;
use pagelens::crawler::Crawler;
use pagelens::model::MarkupVersion;
use pagelens::storage::{SqliteStorage, Storage};
use pagelens::LensError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Test Page</title>
</head>
<body>
    <h1>Main Heading</h1>
    <h2>Sub Heading</h2>
    <a href="/internal">Internal Link</a>
    <a href="{EXTERNAL}">External Link</a>
    <form>
        <input type="password" name="pwd" />
    </form>
</body>
</html>
"#;

/// Creates a fetcher configuration with short probe timeouts for testing
fn test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        user_agent: "TestLens/1.0".to_string(),
        page_timeout_secs: 5,
        probe_timeout_ms: 500,
        probe_concurrency: 4,
    }
}

fn test_crawler() -> Crawler<SqliteStorage> {
    let storage = SqliteStorage::open_in_memory().expect("Failed to open store");
    Crawler::new(&test_fetcher_config(), storage).expect("Failed to build crawler")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_login_page() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        LOGIN_PAGE.replace("{EXTERNAL}", &format!("{}/landing", external.uri())),
    )
    .await;
    mount_head(&site, "/internal", 200).await;
    mount_head(&external, "/landing", 200).await;

    let crawler = test_crawler();
    let url = format!("{}/", site.uri());
    let record = crawler.run_single(&url).await.expect("Analysis failed");

    let analysis = &record.analysis;
    assert_eq!(analysis.url, url);
    assert_eq!(analysis.markup_version, MarkupVersion::Html5);
    assert_eq!(analysis.title, "Test Page");
    assert_eq!(analysis.headings.get(1), 1);
    assert_eq!(analysis.headings.get(2), 1);
    for level in 3..=6 {
        assert_eq!(analysis.headings.get(level), 0);
    }
    assert_eq!(analysis.internal_links, 1);
    assert_eq!(analysis.external_links, 1);
    assert_eq!(analysis.inaccessible_links, 0);
    assert!(analysis.broken_links.is_empty());
    assert!(analysis.has_login_form);

    let history = crawler.history().expect("Failed to list history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, record.id);
}

#[tokio::test]
async fn test_broken_links_recorded_in_anchor_order() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<html lang="en"><body>
            <a href="/gone">gone</a>
            <a href="/ok">ok</a>
            <a href="http://127.0.0.1:1/refused">refused</a>
            <a href="/error">error</a>
            <a href="">empty</a>
            <a href="/ok">ok again</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_head(&site, "/gone", 410).await;
    mount_head(&site, "/ok", 200).await;
    mount_head(&site, "/error", 503).await;

    let crawler = test_crawler();
    let record = crawler
        .run_single(&format!("{}/", site.uri()))
        .await
        .expect("Analysis failed");
    let analysis = &record.analysis;

    assert_eq!(analysis.markup_version, MarkupVersion::Html5);
    // Empty href is not counted anywhere; the duplicate /ok is counted twice
    assert_eq!(analysis.internal_links, 4);
    assert_eq!(analysis.external_links, 1);
    assert_eq!(analysis.inaccessible_links, 3);

    let broken: Vec<(&str, u16)> = analysis
        .broken_links
        .iter()
        .map(|b| (b.url.as_str(), b.status_code))
        .collect();
    assert_eq!(broken.len(), 3);
    assert!(broken[0].0.ends_with("/gone"));
    assert_eq!(broken[0].1, 410);
    assert_eq!(broken[1], ("http://127.0.0.1:1/refused", 0));
    assert!(broken[2].0.ends_with("/error"));
    assert_eq!(broken[2].1, 503);

    assert!(analysis.broken_links[0].error_message.is_none());
    assert!(analysis.broken_links[1].error_message.is_some());
}

#[tokio::test]
async fn test_hung_probe_is_bounded_by_its_timeout() {
    let site = MockServer::start().await;

    mount_page(
        &site,
        "/",
        r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#.to_string(),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&site)
        .await;
    mount_head(&site, "/fast", 200).await;

    let crawler = test_crawler();
    let started = std::time::Instant::now();
    let record = crawler
        .run_single(&format!("{}/", site.uri()))
        .await
        .expect("Analysis failed");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(record.analysis.inaccessible_links, 1);
    assert_eq!(record.analysis.broken_links[0].status_code, 0);
}

#[tokio::test]
async fn test_reanalysis_updates_in_place() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Before</title>"))
        .up_to_n_times(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>After</title><h3>new</h3>"),
        )
        .mount(&site)
        .await;

    let crawler = test_crawler();
    let url = format!("{}/", site.uri());

    let first = crawler.run_single(&url).await.expect("First run failed");
    let second = crawler.run_single(&url).await.expect("Second run failed");

    assert_eq!(first.analysis.title, "Before");
    assert_eq!(second.analysis.title, "After");
    assert_eq!(second.analysis.headings.get(3), 1);
    assert_eq!(first.id, second.id);
    assert_eq!(crawler.history().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_is_terminal() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&site)
        .await;

    let crawler = test_crawler();
    let result = crawler.run_single(&format!("{}/private", site.uri())).await;

    assert!(matches!(result, Err(LensError::Fetch(_))));
    assert!(crawler.history().unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_rerun_isolates_failures() {
    let site = MockServer::start().await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&site, route, format!("<title>{}</title>", route)).await;
    }

    let crawler = test_crawler();
    let mut ids = Vec::new();
    for route in ["/a", "/b", "/c"] {
        let record = crawler
            .run_single(&format!("{}{}", site.uri(), route))
            .await
            .expect("Seed run failed");
        ids.push(record.id);
    }

    // A stored URL that can no longer be fetched
    let unreachable = "http://127.0.0.1:1/gone";
    let stale = {
        let shared = crawler.storage();
        let mut storage = shared.lock().unwrap();
        let mut analysis = pagelens::PageAnalysis::new(unreachable);
        analysis.title = "Stale".to_string();
        storage.upsert(unreachable, &analysis).expect("Seed upsert failed")
    };
    ids.insert(1, stale.id);

    let summary = crawler.run_bulk_rerun(&ids).await.expect("Re-run failed");

    assert_eq!(summary.success_count, 3);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(summary.failed_urls, vec![unreachable.to_string()]);

    // The failed re-run leaves the earlier stored analysis untouched
    let kept = crawler.record(stale.id).expect("Stale record vanished");
    assert_eq!(kept.analysis.title, "Stale");
}

#[tokio::test]
async fn test_bulk_delete_then_reanalyze_gets_fresh_id() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<title>Again</title>".to_string()).await;

    let crawler = test_crawler();
    let url = format!("{}/", site.uri());
    let first = crawler.run_single(&url).await.expect("First run failed");

    assert_eq!(crawler.bulk_delete(&[first.id, 12345]).unwrap(), 1);
    assert!(crawler.history().unwrap().is_empty());

    let second = crawler.run_single(&url).await.expect("Second run failed");
    assert_ne!(first.id, second.id);
}
