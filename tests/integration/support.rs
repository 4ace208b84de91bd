//! Shared fixtures: mock site pages, item payloads, and a recording renderer

use hn_harvest::archive::{PdfRenderer, RenderError};
use hn_harvest::config::{RunConfig, Selection, Settings};
use hn_harvest::listing::PageSpec;
use hn_harvest::session::Credentials;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const USER: &str = "alice";

/// Matches requests whose query string lacks `name`
pub struct QueryParamMissing(pub &'static str);

impl Match for QueryParamMissing {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Settings pointing both the site and the API at the mock server
pub fn test_settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.site.base_url = format!("{}/", server.uri());
    settings.api.base_url = format!("{}/v0/", server.uri());
    settings.api.request_delay_ms = 0;
    settings.api.timeout_secs = 5;
    settings.site.timeout_secs = 5;
    settings
}

pub fn test_config(server: &MockServer, output_file: Option<PathBuf>, output_folder: &Path) -> RunConfig {
    RunConfig {
        credentials: Credentials::new(USER, "secret"),
        output_file,
        pages: PageSpec::from_count(1),
        selection: Selection::Both,
        pdf: false,
        output_folder: output_folder.to_path_buf(),
        settings: test_settings(server),
    }
}

/// Accepts the login for `USER` and sets a session cookie
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("acct=alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "user=alice&token; Path=/")
                .set_body_string(
                    r#"<html><body><a id="me" href="user?id=alice">alice</a> (12)</body></html>"#,
                ),
        )
        .mount(server)
        .await;
}

/// A stories listing page with one row per id and an optional "more" link
pub fn stories_page(ids: &[u64], more: Option<&str>) -> String {
    let mut rows = String::new();
    for id in ids {
        rows.push_str(&format!(
            r#"<tr class="athing" id="{id}"><td class="title"><a href="https://site.test/{id}">Story {id}</a></td></tr>
<tr><td class="subtext"><span class="score">3 points</span> by <a href="user?id=bob">bob</a>
<a href="item?id={id}">1 hour ago</a> | <a href="hide?id={id}&amp;goto=upvoted">hide</a> | <a href="item?id={id}">discuss</a></td></tr>
"#
        ));
    }
    if let Some(href) = more {
        rows.push_str(&format!(
            r#"<tr><td class="title"><a href="{href}" class="morelink" rel="next">More</a></td></tr>"#
        ));
    }
    format!("<html><body><table>{rows}</table></body></html>")
}

/// A comments listing page with one cell per id
pub fn comments_page(ids: &[u64]) -> String {
    let mut rows = String::new();
    for id in ids {
        rows.push_str(&format!(
            r#"<tr class="athing" id="{id}"><td class="default"><span class="comhead">
<a href="user?id=carol">carol</a> <span class="age"><a href="item?id={id}">2 hours ago</a></span>
| <a href="item?id=1">parent</a></span><div class="comment">hello</div></td></tr>
"#
        ));
    }
    format!("<html><body><table>{rows}</table></body></html>")
}

/// Serves `body` as stories listing page `page`
pub async fn mount_stories_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .and(query_param("id", USER))
        .and(query_param("p", page.to_string().as_str()))
        .and(QueryParamMissing("comments"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves `body` as comments listing page `page`
pub async fn mount_comments_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/upvoted"))
        .and(query_param("id", USER))
        .and(query_param("comments", "t"))
        .and(query_param("p", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub fn story_json(id: u64, title: &str, url: &str) -> serde_json::Value {
    serde_json::json!({
        "by": "bob",
        "descendants": 2,
        "id": id,
        "kids": [id * 10, id * 10 + 1],
        "score": 3,
        "time": 1700000000,
        "title": title,
        "type": "story",
        "url": url
    })
}

pub fn comment_json(id: u64) -> serde_json::Value {
    serde_json::json!({
        "by": "carol",
        "id": id,
        "kids": [id + 1],
        "parent": 1,
        "text": "hello",
        "time": 1700000100,
        "type": "comment"
    })
}

/// Serves `body` for item `id`, expecting exactly `calls` requests
pub async fn mount_item(server: &MockServer, id: u64, body: serde_json::Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{}.json", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Writes a small fake PDF and records the URLs it was asked to render
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PdfRenderer for RecordingRenderer {
    fn render(&self, url: &str, dest: &Path) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(url.to_string());
        std::fs::write(dest, vec![b'%'; 4096]).map_err(|source| RenderError::Spawn {
            program: "recording".to_string(),
            source,
        })
    }
}
