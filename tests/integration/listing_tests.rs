//! Session, pagination, scraping, and item fetching against a mock site

use crate::support::*;
use hn_harvest::config::ApiConfig;
use hn_harvest::item::{ItemFetcher, ItemId, ItemKind};
use hn_harvest::listing::{resolve_page_range, scrape_listing, ListingKind, PageRange, PageSpec};
use hn_harvest::session::{AuthError, Credentials, Session};
use hn_harvest::HarvestError;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn login(server: &MockServer) -> Session {
    mount_login(server).await;
    Session::login(&test_settings(server).site, &Credentials::new(USER, "secret"))
        .await
        .expect("login should succeed")
}

fn api_config(server: &MockServer) -> ApiConfig {
    test_settings(server).api
}

#[tokio::test]
async fn test_bad_login_is_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Bad login.<br><br><b>Login</b> alice"),
        )
        .mount(&mock_server)
        .await;

    let result = Session::login(
        &test_settings(&mock_server).site,
        &Credentials::new(USER, "wrong"),
    )
    .await;

    assert!(matches!(
        result,
        Err(HarvestError::Auth(AuthError::BadLogin { .. }))
    ));
}

#[tokio::test]
async fn test_login_without_username_is_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Hacker News</html>"))
        .mount(&mock_server)
        .await;

    let result = Session::login(
        &test_settings(&mock_server).site,
        &Credentials::new(USER, "secret"),
    )
    .await;

    assert!(matches!(
        result,
        Err(HarvestError::Auth(AuthError::UsernameNotShown { .. }))
    ));
}

#[tokio::test]
async fn test_listing_requests_carry_session_cookie() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_string(stories_page(&[5], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ids = scrape_listing(&session, USER, ListingKind::Stories, &PageRange::new(1))
        .await
        .unwrap();
    assert_eq!(ids, vec!["5".to_string()]);
}

#[tokio::test]
async fn test_fixed_range_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let range = resolve_page_range(&session, USER, PageSpec::from_count(4), 1000)
        .await
        .unwrap();
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_discovery_follows_more_links() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .and(query_param("id", USER))
        .and(QueryParamMissing("p"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(stories_page(&[1], Some("upvoted?id=alice&amp;p=2"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_stories_page(&mock_server, 2, stories_page(&[2], Some("upvoted?id=alice&amp;p=3"))).await;
    mount_stories_page(&mock_server, 3, stories_page(&[3], None)).await;

    let range = resolve_page_range(&session, USER, PageSpec::Discover, 1000)
        .await
        .unwrap();

    assert_eq!(range.len(), 3);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_discovery_single_page() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .respond_with(ResponseTemplate::new(200).set_body_string(stories_page(&[1], None)))
        .mount(&mock_server)
        .await;

    let range = resolve_page_range(&session, USER, PageSpec::Discover, 1000)
        .await
        .unwrap();
    assert_eq!(range.len(), 1);
}

#[tokio::test]
async fn test_discovery_stops_on_repeated_link() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    // Every page points at page 2, forever
    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(stories_page(&[1], Some("upvoted?id=alice&amp;p=2"))),
        )
        .mount(&mock_server)
        .await;

    let range = resolve_page_range(&session, USER, PageSpec::Discover, 1000)
        .await
        .unwrap();
    assert_eq!(range.len(), 2);
}

#[tokio::test]
async fn test_scrape_concatenates_pages_in_order() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    mount_stories_page(&mock_server, 1, stories_page(&[10, 11], None)).await;
    mount_stories_page(&mock_server, 2, stories_page(&[11, 12], None)).await;
    mount_comments_page(&mock_server, 1, comments_page(&[20])).await;
    mount_comments_page(&mock_server, 2, comments_page(&[21, 22])).await;

    let stories = scrape_listing(&session, USER, ListingKind::Stories, &PageRange::new(2))
        .await
        .unwrap();
    assert_eq!(stories, vec!["10", "11", "11", "12"]);

    let comments = scrape_listing(&session, USER, ListingKind::Comments, &PageRange::new(2))
        .await
        .unwrap();
    assert_eq!(comments, vec!["20", "21", "22"]);
}

#[tokio::test]
async fn test_failed_listing_page_is_an_error() {
    let mock_server = MockServer::start().await;
    let session = login(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let result = scrape_listing(&session, USER, ListingKind::Stories, &PageRange::new(1)).await;
    assert!(matches!(result, Err(HarvestError::Http { .. })));
}

#[tokio::test]
async fn test_fetch_strips_kids() {
    let mock_server = MockServer::start().await;
    mount_item(&mock_server, 8863, story_json(8863, "Dropbox", "http://d.test/"), 1).await;

    let fetcher = ItemFetcher::new(&api_config(&mock_server)).unwrap();
    let item = fetcher.fetch("8863").await;

    assert_eq!(item.id, ItemId::Numeric(8863));
    assert_eq!(item.kind, Some(ItemKind::Story));
    assert_eq!(item.title.as_deref(), Some("Dropbox"));
    assert!(!item.extra.contains_key("kids"));

    let serialized = serde_json::to_value(&item).unwrap();
    assert!(serialized.get("kids").is_none());
}

#[tokio::test]
async fn test_fetch_failure_yields_placeholder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/404.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/item/405.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/item/406.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let fetcher = ItemFetcher::new(&api_config(&mock_server)).unwrap();
    for id in ["404", "405", "406"] {
        let item = fetcher.fetch(id).await;
        assert!(item.is_placeholder(), "expected placeholder for {}", id);
        assert_eq!(item.id.key(), id);
        assert_eq!(
            item.title,
            Some(format!("Item {} could not be retrieved", id))
        );
    }
}

#[tokio::test]
async fn test_unreachable_api_yields_placeholder() {
    let mut config = ApiConfig::default();
    config.base_url = "http://127.0.0.1:9/v0/".to_string();
    config.request_delay_ms = 0;
    config.timeout_secs = 2;

    let fetcher = ItemFetcher::new(&config).unwrap();
    let item = fetcher.fetch("1").await;
    assert!(item.is_placeholder());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/7.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_item(&mock_server, 7, story_json(7, "Seven", "http://7.test/"), 1).await;

    let mut config = api_config(&mock_server);
    config.max_retries = 2;
    config.retry_backoff_ms = 1;

    let fetcher = ItemFetcher::new(&config).unwrap();
    let item = fetcher.fetch("7").await;
    assert!(!item.is_placeholder());
    assert_eq!(item.title.as_deref(), Some("Seven"));
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/8.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = ItemFetcher::new(&api_config(&mock_server)).unwrap();
    assert!(fetcher.fetch("8").await.is_placeholder());
}
