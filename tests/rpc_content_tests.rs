mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{admin_login, rpc_get, rpc_post, spawn_app};

async fn create(app: &axum::Router, admin: &str, procedure: &str, input: Value) -> i64 {
    let (status, body) = rpc_post(app, procedure, input, Some(admin)).await;
    assert_eq!(status, StatusCode::OK, "{procedure} failed: {body}");
    body["result"]["id"].as_i64().expect("created id")
}

#[tokio::test]
async fn category_lifecycle() {
    let t = spawn_app("category-lifecycle").await;
    let admin = admin_login(&t.app).await;

    let id = create(
        &t.app,
        &admin,
        "categories.create",
        json!({"name": "Ege Koyları", "slug": "ege-koylari", "color": "#0ea5e9"}),
    )
    .await;

    let (status, body) = rpc_get(&t.app, "categories.getBySlug", Some(json!({"slug": "ege-koylari"})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], id);
    assert_eq!(body["result"]["isActive"], true);
    assert_eq!(body["result"]["sortOrder"], 0);
    let first_update = body["result"]["updatedAt"].clone();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, body) = rpc_post(
        &t.app,
        "categories.update",
        json!({"id": id, "description": "Kıyı rotaları", "color": null}),
        Some(&admin),
    )
    .await;
    assert_eq!(body["result"]["success"], true);

    let (_, body) = rpc_get(&t.app, "categories.getById", Some(json!({"id": id})), None).await;
    assert_eq!(body["result"]["description"], "Kıyı rotaları");
    assert!(body["result"]["color"].is_null());
    assert_eq!(body["result"]["name"], "Ege Koyları");
    assert_ne!(body["result"]["updatedAt"], first_update);

    let (_, body) = rpc_post(&t.app, "categories.delete", json!({"id": id}), Some(&admin)).await;
    assert_eq!(body["result"]["success"], true);
    let (_, body) = rpc_get(&t.app, "categories.getById", Some(json!({"id": id})), None).await;
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn missing_rows_report_no_success() {
    let t = spawn_app("missing-rows").await;
    let admin = admin_login(&t.app).await;

    let (status, body) = rpc_post(&t.app, "pages.update", json!({"id": 999, "title": "Yok"}), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], false);

    let (status, body) = rpc_post(&t.app, "posts.delete", json!({"id": 999}), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], false);
}

#[tokio::test]
async fn invalid_writes_are_bad_requests() {
    let t = spawn_app("invalid-writes").await;
    let admin = admin_login(&t.app).await;

    create(&t.app, &admin, "categories.create", json!({"name": "Akdeniz", "slug": "akdeniz"})).await;

    let (status, body) =
        rpc_post(&t.app, "categories.create", json!({"name": "Tekrar", "slug": "akdeniz"}), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) =
        rpc_post(&t.app, "categories.create", json!({"name": "  ", "slug": "bos"}), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = rpc_post(&t.app, "posts.create", json!({"slug": "basliksiz"}), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = rpc_post(&t.app, "caravanRoutes.update", json!({"name": "x"}), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_procedure_is_not_found() {
    let t = spawn_app("unknown-procedure").await;
    let (status, body) = rpc_get(&t.app, "posts.explode", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = rpc_get(&t.app, "nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_are_hidden_from_the_public() {
    let t = spawn_app("drafts").await;
    let admin = admin_login(&t.app).await;

    create(&t.app, &admin, "posts.create", json!({"title": "Yayında", "slug": "yayinda", "isPublished": true})).await;
    let draft = create(&t.app, &admin, "posts.create", json!({"title": "Taslak", "slug": "taslak"})).await;

    let (_, body) = rpc_get(&t.app, "posts.list", Some(json!({"publishedOnly": false})), None).await;
    let slugs: Vec<&str> = body["result"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["slug"].as_str())
        .collect();
    assert_eq!(slugs, vec!["yayinda"]);

    let (_, body) = rpc_get(&t.app, "posts.list", None, Some(&admin)).await;
    assert_eq!(body["result"].as_array().map(Vec::len), Some(1));

    let (_, body) = rpc_get(&t.app, "posts.list", Some(json!({"publishedOnly": false})), Some(&admin)).await;
    assert_eq!(body["result"].as_array().map(Vec::len), Some(2));

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": draft})), None).await;
    assert!(body["result"].is_null());
    let (_, body) = rpc_get(&t.app, "posts.getBySlug", Some(json!({"slug": "taslak"})), None).await;
    assert!(body["result"].is_null());
    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": draft})), Some(&admin)).await;
    assert_eq!(body["result"]["slug"], "taslak");
    assert!(body["result"]["publishedAt"].is_null());
}

#[tokio::test]
async fn reading_by_slug_counts_views() {
    let t = spawn_app("view-count").await;
    let admin = admin_login(&t.app).await;
    let id = create(
        &t.app,
        &admin,
        "posts.create",
        json!({"title": "Bodrum'dan Datça'ya", "slug": "bodrum-datca", "isPublished": true}),
    )
    .await;

    for _ in 0..4 {
        let (status, _) = rpc_get(&t.app, "posts.getBySlug", Some(json!({"slug": "bodrum-datca"})), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": id})), None).await;
    assert_eq!(body["result"]["viewCount"], 4);
    assert!(body["result"]["publishedAt"].is_string());
}

#[tokio::test]
async fn failed_view_count_surfaces_as_error() {
    let t = spawn_app("view-count-fail").await;
    let admin = admin_login(&t.app).await;
    let id = create(
        &t.app,
        &admin,
        "posts.create",
        json!({"title": "Kaş koyları", "slug": "kas-koylari", "isPublished": true}),
    )
    .await;

    let side = t.raw_pool().await;
    sqlx::query(
        "CREATE TRIGGER freeze_views BEFORE UPDATE OF view_count ON posts \
         BEGIN SELECT RAISE(ABORT, 'views frozen'); END",
    )
    .execute(&side)
    .await
    .expect("create trigger");

    let (status, body) = rpc_get(&t.app, "posts.getBySlug", Some(json!({"slug": "kas-koylari"})), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

    sqlx::query("DROP TRIGGER freeze_views")
        .execute(&side)
        .await
        .expect("drop trigger");
    side.close().await;

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": id})), None).await;
    assert_eq!(body["result"]["viewCount"], 0);
}

#[tokio::test]
async fn publishing_a_draft_sets_its_publish_date_once() {
    let t = spawn_app("publish-draft").await;
    let admin = admin_login(&t.app).await;
    let id = create(&t.app, &admin, "posts.create", json!({"title": "Fethiye", "slug": "fethiye"})).await;

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": id})), Some(&admin)).await;
    assert!(body["result"]["publishedAt"].is_null());

    let (status, body) = rpc_post(&t.app, "posts.update", json!({"id": id, "isPublished": true}), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], true);

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": id})), None).await;
    let first = body["result"]["publishedAt"].clone();
    assert!(first.is_string());

    rpc_post(&t.app, "posts.update", json!({"id": id, "isPublished": true}), Some(&admin)).await;
    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": id})), None).await;
    assert_eq!(body["result"]["publishedAt"], first);
}

#[tokio::test]
async fn deleting_a_category_detaches_its_posts() {
    let t = spawn_app("category-delete").await;
    let admin = admin_login(&t.app).await;

    let category = create(&t.app, &admin, "categories.create", json!({"name": "Rotalar", "slug": "rotalar"})).await;
    let post = create(
        &t.app,
        &admin,
        "posts.create",
        json!({"title": "Göcek", "slug": "gocek", "categoryId": category, "isPublished": true}),
    )
    .await;

    let (_, body) = rpc_get(&t.app, "posts.getByCategory", Some(json!({"categoryId": category})), None).await;
    assert_eq!(body["result"].as_array().map(Vec::len), Some(1));

    rpc_post(&t.app, "categories.delete", json!({"id": category}), Some(&admin)).await;

    let (_, body) = rpc_get(&t.app, "posts.getById", Some(json!({"id": post})), None).await;
    assert_eq!(body["result"]["slug"], "gocek");
    assert!(body["result"]["categoryId"].is_null());
}

#[tokio::test]
async fn featured_listings_skip_unpublished() {
    let t = spawn_app("featured").await;
    let admin = admin_login(&t.app).await;

    create(
        &t.app,
        &admin,
        "caravanRoutes.create",
        json!({
            "name": "Likya Yolu",
            "slug": "likya-yolu",
            "isPublished": true,
            "isFeatured": true,
            "difficulty": "hard",
            "locations": ["Fethiye", "Kaş"],
            "mapCoordinates": [{"lat": 36.62, "lng": 29.11}]
        }),
    )
    .await;
    create(
        &t.app,
        &admin,
        "caravanRoutes.create",
        json!({"name": "Gizli Koy", "slug": "gizli-koy", "isFeatured": true}),
    )
    .await;

    let (_, body) = rpc_get(&t.app, "caravanRoutes.getFeatured", None, None).await;
    let routes = body["result"].as_array().expect("array");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["slug"], "likya-yolu");
    assert_eq!(routes[0]["difficulty"], "hard");
    assert_eq!(routes[0]["locations"], json!(["Fethiye", "Kaş"]));
    assert_eq!(routes[0]["mapCoordinates"][0]["lat"], 36.62);
}

#[tokio::test]
async fn settings_upsert_merges_by_key() {
    let t = spawn_app("settings").await;
    let admin = admin_login(&t.app).await;

    let (status, _) = rpc_post(
        &t.app,
        "siteSettings.upsert",
        json!({"key": "site_name", "value": "Viya Kaptan", "group": "general", "label": "Site adı"}),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    rpc_post(
        &t.app,
        "siteSettings.upsert",
        json!({"key": "site_name", "value": "Viya Kaptan Yelken"}),
        Some(&admin),
    )
    .await;

    let (_, body) = rpc_get(&t.app, "siteSettings.getByKey", Some(json!({"key": "site_name"})), None).await;
    assert_eq!(body["result"]["value"], "Viya Kaptan Yelken");
    assert_eq!(body["result"]["label"], "Site adı");
    assert_eq!(body["result"]["group"], "general");
    assert_eq!(body["result"]["type"], "text");

    let (status, _) = rpc_post(&t.app, "siteSettings.upsert", json!({"key": ""}), Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = rpc_get(&t.app, "siteSettings.getByGroup", Some(json!({"group": "general"})), None).await;
    assert_eq!(body["result"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn bulk_upsert_is_all_or_nothing() {
    let t = spawn_app("settings-bulk").await;
    let admin = admin_login(&t.app).await;

    let (status, _) = rpc_post(
        &t.app,
        "siteSettings.bulkUpsert",
        json!([{"key": "phone", "value": "+90 555"}, {"key": ""}]),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = rpc_get(&t.app, "siteSettings.list", None, None).await;
    assert_eq!(body["result"], json!([]));

    let (status, body) = rpc_post(
        &t.app,
        "siteSettings.bulkUpsert",
        json!([{"key": "phone", "value": "+90 555"}, {"key": "email", "value": "info@viyakaptan.com"}]),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], true);

    let (_, body) = rpc_get(&t.app, "siteSettings.list", None, None).await;
    let keys: Vec<&str> = body["result"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|s| s["key"].as_str())
        .collect();
    assert_eq!(keys, vec!["email", "phone"]);

    let (_, body) = rpc_post(&t.app, "siteSettings.delete", json!({"key": "phone"}), Some(&admin)).await;
    assert_eq!(body["result"]["success"], true);
}

#[tokio::test]
async fn homepage_aggregates_public_content() {
    let t = spawn_app("homepage").await;
    let admin = admin_login(&t.app).await;

    create(&t.app, &admin, "heroSections.create", json!({"title": "Eski", "sortOrder": 2})).await;
    create(&t.app, &admin, "heroSections.create", json!({"title": "Gizli", "sortOrder": 0, "isActive": false})).await;
    create(&t.app, &admin, "heroSections.create", json!({"title": "Mavi Yolculuk", "sortOrder": 1})).await;
    create(&t.app, &admin, "featureCards.create", json!({"title": "Deneyimli Kaptan"})).await;
    create(&t.app, &admin, "featureCards.create", json!({"title": "Pasif", "isActive": false})).await;
    create(
        &t.app,
        &admin,
        "posts.create",
        json!({"title": "Öne çıkan", "slug": "one-cikan", "isPublished": true, "isFeatured": true}),
    )
    .await;
    rpc_post(&t.app, "siteSettings.upsert", json!({"key": "site_name", "value": "Viya Kaptan"}), Some(&admin)).await;
    rpc_post(&t.app, "siteSettings.upsert", json!({"key": "hero_video"}), Some(&admin)).await;

    let (status, body) = rpc_get(&t.app, "homepage.getData", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["result"];
    assert_eq!(data["hero"]["title"], "Mavi Yolculuk");
    assert_eq!(data["features"].as_array().map(Vec::len), Some(1));
    assert_eq!(data["posts"][0]["slug"], "one-cikan");
    assert_eq!(data["routes"], json!([]));
    assert_eq!(data["settings"], json!({"site_name": "Viya Kaptan"}));
}

#[tokio::test]
async fn team_and_dashboard() {
    let t = spawn_app("team-dashboard").await;
    let admin = admin_login(&t.app).await;

    let id = create(
        &t.app,
        &admin,
        "teamMembers.create",
        json!({"name": "Deniz", "title": "Kaptan", "socialLinks": {"instagram": "@deniz"}}),
    )
    .await;
    let (_, body) = rpc_get(&t.app, "teamMembers.getById", Some(json!({"id": id})), None).await;
    assert_eq!(body["result"]["socialLinks"]["instagram"], "@deniz");

    create(&t.app, &admin, "pages.create", json!({"title": "Hakkımızda", "slug": "hakkimizda"})).await;
    create(&t.app, &admin, "categories.create", json!({"name": "Blog", "slug": "blog"})).await;

    let (status, body) = rpc_get(&t.app, "dashboard.stats", None, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({"posts": 0, "routes": 0, "categories": 1, "pages": 1}));
}
