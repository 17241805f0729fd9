//! Integration tests for the emoji catalog backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::seed::{self, PAGE_KEYWORDS};
use crate::{create_router, AppState};

const ADMIN_KEY: &str = "test-api-key";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some(ADMIN_KEY.to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize and seed database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));
        seed::run(&repo).await.expect("Failed to seed DB");

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            seed_on_startup: true,
            backfill_on_startup: false,
        };

        let app = create_router(AppState::new(repo, config));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

fn data_array(body: &Value) -> &Vec<Value> {
    body["data"].as_array().expect("data is not an array")
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_list_emojis_in_id_order() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/emojis").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    let emojis = data_array(&body);
    assert_eq!(emojis.len(), seed::catalog().unwrap().len());
    assert_eq!(emojis[0]["id"], 1);
    assert_eq!(emojis[0]["slug"], "grinning-face");
    assert_eq!(emojis[0]["copyCount"], 0);
    assert!(emojis
        .windows(2)
        .all(|w| w[0]["id"].as_i64() < w[1]["id"].as_i64()));
}

#[tokio::test]
async fn test_search_filter_is_case_insensitive() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/emojis?search=HEART").await;

    assert_eq!(status, 200);
    let emojis = data_array(&body);
    assert!(!emojis.is_empty());
    for emoji in emojis {
        let name = emoji["name"].as_str().unwrap().to_lowercase();
        let keyword_hit = emoji["keywords"]
            .as_array()
            .unwrap()
            .iter()
            .any(|k| k.as_str().unwrap().to_lowercase().contains("heart"));
        assert!(name.contains("heart") || keyword_hit);
    }
    assert!(emojis.iter().any(|e| e["slug"] == "red-heart"));
}

#[tokio::test]
async fn test_search_matches_keywords_only() {
    let fixture = TestFixture::new().await;

    // "lol" only appears in keywords, never in a name
    let (_, body) = fixture.get_json("/api/emojis?search=lol").await;
    let slugs: Vec<&str> = data_array(&body)
        .iter()
        .map(|e| e["slug"].as_str().unwrap())
        .collect();

    assert!(slugs.contains(&"face-with-tears-of-joy"));
    assert!(slugs.contains(&"skull"));
    assert!(!slugs.contains(&"pizza"));
}

#[tokio::test]
async fn test_category_filter_is_exact() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get_json("/api/emojis?category=Flags").await;
    let emojis = data_array(&body);
    assert_eq!(emojis.len(), 2);
    assert!(emojis.iter().all(|e| e["category"] == "Flags"));

    let (_, body) = fixture.get_json("/api/emojis?category=flags").await;
    assert!(data_array(&body).is_empty());
}

#[tokio::test]
async fn test_search_and_category_combine() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .get_json("/api/emojis?search=rainbow&category=Flags")
        .await;
    let emojis = data_array(&body);

    assert_eq!(emojis.len(), 1);
    assert_eq!(emojis[0]["slug"], "rainbow-flag");
}

#[tokio::test]
async fn test_categories() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/emojis/categories").await;

    assert_eq!(status, 200);
    let categories = data_array(&body);
    assert_eq!(categories[0]["name"], "Smileys & Emotion");
    let total: i64 = categories.iter().map(|c| c["count"].as_i64().unwrap()).sum();
    assert_eq!(total as usize, seed::catalog().unwrap().len());
}

#[tokio::test]
async fn test_get_emoji_by_slug() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/emojis/fire").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["emoji"], "🔥");
    assert_eq!(body["data"]["category"], "Travel & Places");

    let (status, body) = fixture.get_json("/api/emojis/not-an-emoji").await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_copy_increments_by_one() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/emojis/3/copy", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["id"], 3);
    assert_eq!(body["data"]["copyCount"], 1);

    let (_, body) = fixture.post_json("/api/emojis/3/copy", json!({})).await;
    assert_eq!(body["data"]["copyCount"], 2);
}

#[tokio::test]
async fn test_copy_unknown_emoji_is_not_found() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/emojis/9999/copy", json!({})).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Nothing else moved
    let (_, body) = fixture.get_json("/api/emojis/trending?limit=50").await;
    assert!(data_array(&body).iter().all(|e| e["copyCount"] == 0));
}

#[tokio::test]
async fn test_copy_is_public_even_with_psk() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .post(fixture.url("/api/emojis/1/copy"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_trending_orders_by_copies_then_id() {
    let fixture = TestFixture::new().await;

    for id in [5, 5, 2, 9] {
        fixture
            .post_json(&format!("/api/emojis/{}/copy", id), json!({}))
            .await;
    }

    let (status, body) = fixture.get_json("/api/emojis/trending?limit=4").await;
    assert_eq!(status, 200);
    let ids: Vec<i64> = data_array(&body)
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5, 2, 9, 1]);
}

#[tokio::test]
async fn test_trending_limit_is_clamped() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get_json("/api/emojis/trending").await;
    assert_eq!(data_array(&body).len(), 10);

    let (_, body) = fixture.get_json("/api/emojis/trending?limit=0").await;
    assert_eq!(data_array(&body).len(), 1);
}

#[tokio::test]
async fn test_seeded_page_stubs() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/pages").await;
    assert_eq!(status, 200);
    let pages = data_array(&body);
    assert_eq!(pages.len(), PAGE_KEYWORDS.len());
    assert!(pages.iter().all(|p| p["generated"] == false));

    let (status, body) = fixture.get_json("/api/pages/heart-emoji").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["keyword"], "heart emoji");
    assert_eq!(body["data"]["title"], "Heart Emoji - Copy and Paste");
    assert!(body["data"].get("content").is_none());

    let (status, _) = fixture.get_json("/api/pages/missing-page").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_generate_fills_stub_and_is_idempotent() {
    let fixture = TestFixture::new().await;

    let (status, first) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "heart emoji" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(first["data"]["slug"], "heart-emoji");
    assert_eq!(first["data"]["generated"], true);
    let content = first["data"]["content"].as_str().unwrap();
    assert!(content.starts_with("# Heart Emoji: Copy and Paste"));
    let related = first["data"]["relatedEmojis"].as_array().unwrap();
    assert!(!related.is_empty() && related.len() <= 20);
    assert!(related.iter().any(|g| *g == "❤️"));

    let (_, second) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "Heart Emoji" }))
        .await;
    assert_eq!(second["data"], first["data"]);
}

#[tokio::test]
async fn test_generate_creates_new_page() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "rocket emoji" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "rocket-emoji");
    assert_eq!(body["data"]["relatedEmojis"], json!(["🚀"]));

    let (_, body) = fixture.get_json("/api/pages?generated=true").await;
    let pages = data_array(&body);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["keyword"], "rocket emoji");
}

#[tokio::test]
async fn test_generate_requires_keyword() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/pages/generate", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "   " }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_generate_batch_is_bounded() {
    let fixture = TestFixture::new().await;
    let total = PAGE_KEYWORDS.len() as i64;

    let (status, body) = fixture
        .post_json("/api/pages/generate-batch", json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["generated"], 5);
    assert_eq!(body["data"]["remaining"], total - 5);

    let (_, body) = fixture.get_json("/api/pages?generated=true").await;
    assert_eq!(data_array(&body).len(), 5);

    let (_, body) = fixture
        .post_json("/api/pages/generate-batch", json!({ "limit": 2 }))
        .await;
    assert_eq!(body["data"]["generated"], 2);
    assert_eq!(body["data"]["remaining"], total - 7);
}

#[tokio::test]
async fn test_generate_batch_without_body() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/pages/generate-batch"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["generated"], 5);
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json("/api/pages/generate-batch", json!({ "limit": 0 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture
        .post_json("/api/pages/backfill", json!({ "batchSize": 0 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = fixture.get_json("/api/pages?generated=true").await;
    assert!(data_array(&body).is_empty());
}

#[tokio::test]
async fn test_malformed_params_return_error_envelope() {
    let fixture = TestFixture::new().await;

    for path in ["/api/emojis/trending?limit=abc", "/api/pages?generated=maybe"] {
        let (status, body) = fixture.get_json(path).await;
        assert_eq!(status, 400, "{}", path);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    let (status, body) = fixture.post_json("/api/emojis/abc/copy", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let resp = fixture
        .client
        .patch(fixture.url("/api/pages/abc"))
        .json(&json!({ "title": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_generate_rejects_route_slugs() {
    let fixture = TestFixture::new().await;

    for keyword in ["generate", "generate batch", "Backfill"] {
        let (status, body) = fixture
            .post_json("/api/pages/generate", json!({ "keyword": keyword }))
            .await;
        assert_eq!(status, 400, "{}", keyword);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    let (_, body) = fixture.get_json("/api/pages").await;
    assert_eq!(data_array(&body).len(), PAGE_KEYWORDS.len());
}

#[tokio::test]
async fn test_batch_loop_drains_all_stubs() {
    let fixture = TestFixture::new().await;

    let mut total = 0;
    for _ in 0..20 {
        let (_, body) = fixture
            .post_json("/api/pages/generate-batch", json!({ "limit": 5 }))
            .await;
        let generated = body["data"]["generated"].as_u64().unwrap();
        assert!(generated <= 5);
        if generated == 0 {
            break;
        }
        total += generated;
    }

    assert_eq!(total as usize, PAGE_KEYWORDS.len());
    let (_, body) = fixture.get_json("/api/pages?generated=false").await;
    assert!(data_array(&body).is_empty());
}

#[tokio::test]
async fn test_backfill_endpoint() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json("/api/pages/backfill", json!({ "batchSize": 5, "maxRounds": 2 }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["generated"], 10);
    assert_eq!(body["data"]["rounds"], 2);
    assert_eq!(body["data"]["remaining"], PAGE_KEYWORDS.len() as i64 - 10);

    let (_, body) = fixture.post_json("/api/pages/backfill", json!({})).await;
    assert_eq!(body["data"]["remaining"], 0);
}

#[tokio::test]
async fn test_manual_edit_overrides_generation() {
    let fixture = TestFixture::new().await;

    let (_, page) = fixture.get_json("/api/pages/fire-emoji").await;
    let id = page["data"]["id"].as_i64().unwrap();

    let resp = fixture
        .client
        .patch(fixture.url(&format!("/api/pages/{}", id)))
        .json(&json!({
            "title": "Fire Emojis for Hot Takes",
            "content": "# Hand written",
            "expectedVersion": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Fire Emojis for Hot Takes");
    assert_eq!(body["data"]["generated"], true);
    assert_eq!(body["data"]["version"], 2);

    // Generation leaves the override alone
    let (_, body) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "fire emoji" }))
        .await;
    assert_eq!(body["data"]["content"], "# Hand written");
}

#[tokio::test]
async fn test_manual_edit_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .patch(fixture.url("/api/pages/1"))
        .json(&json!({ "title": "Stale", "expectedVersion": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(body["error"]["details"]["currentVersion"], 1);

    let resp = fixture
        .client
        .patch(fixture.url("/api/pages/1"))
        .json(&json!({ "title": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .patch(fixture.url("/api/pages/9999"))
        .json(&json!({ "title": "Nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_admin_routes_require_psk() {
    let fixture = TestFixture::new().await;
    let anonymous = Client::new();

    let resp = anonymous
        .post(fixture.url("/api/pages/generate-batch"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = anonymous
        .patch(fixture.url("/api/pages/1"))
        .header("x-api-key", "wrong-key")
        .json(&json!({ "title": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Reading pages stays public
    let resp = anonymous
        .get(fixture.url("/api/pages/heart-emoji"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_routes_open_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let (status, body) = fixture
        .post_json("/api/pages/generate", json!({ "keyword": "cat emoji" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["generated"], true);
}
