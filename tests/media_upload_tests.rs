mod common;

use axum::http::StatusCode;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::json;

use common::{admin_login, rpc_get, rpc_post, spawn_app};

#[tokio::test]
async fn placeholder_upload_records_metadata() {
    let t = spawn_app("media-upload").await;
    let admin = admin_login(&t.app).await;
    let bytes = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3, 4, 5];

    let (status, body) = rpc_post(
        &t.app,
        "media.upload",
        json!({
            "filename": "gulet.png",
            "base64": STANDARD.encode(&bytes),
            "mimeType": "image/png",
            "alt": "Gulet at anchor",
            "caption": ""
        }),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["result"]["id"].as_i64().expect("id");
    let url = body["result"]["url"].as_str().expect("url").to_string();
    assert!(url.starts_with("/placeholder/media/"));
    assert!(url.ends_with(".png"));

    let (_, body) = rpc_get(&t.app, "media.getById", Some(json!({"id": id})), None).await;
    let media = &body["result"];
    assert_eq!(media["size"], bytes.len());
    assert_eq!(media["url"], url.as_str());
    assert_eq!(media["filename"], "gulet.png");
    assert_eq!(media["originalName"], "gulet.png");
    assert_eq!(media["mimeType"], "image/png");
    assert_eq!(media["alt"], "Gulet at anchor");
    assert!(media["caption"].is_null());
    assert!(media["uploadedBy"].as_i64().is_some());
    assert_eq!(
        media["storageKey"].as_str(),
        url.strip_prefix("/placeholder/")
    );

    let (_, body) = rpc_get(&t.app, "media.list", None, None).await;
    assert_eq!(body["result"].as_array().map(Vec::len), Some(1));

    let (_, body) = rpc_post(&t.app, "media.delete", json!({"id": id}), Some(&admin)).await;
    assert_eq!(body["result"]["success"], true);
    let (_, body) = rpc_post(&t.app, "media.delete", json!({"id": id}), Some(&admin)).await;
    assert_eq!(body["result"]["success"], false);
}

#[tokio::test]
async fn upload_without_extension_defaults_to_jpg() {
    let t = spawn_app("media-ext").await;
    let admin = admin_login(&t.app).await;

    let (status, body) = rpc_post(
        &t.app,
        "media.upload",
        json!({"filename": "harbor", "base64": STANDARD.encode(b"jpeg"), "mimeType": "image/jpeg"}),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["result"]["url"].as_str().is_some_and(|u| u.ends_with(".jpg")));
}

#[tokio::test]
async fn bad_base64_is_rejected_without_a_row() {
    let t = spawn_app("media-bad-base64").await;
    let admin = admin_login(&t.app).await;

    let (status, body) = rpc_post(
        &t.app,
        "media.upload",
        json!({"filename": "x.png", "base64": "%%% not base64 %%%", "mimeType": "image/png"}),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (_, body) = rpc_get(&t.app, "media.list", Some(json!({"limit": 10})), None).await;
    assert_eq!(body["result"], json!([]));
}

#[tokio::test]
async fn upload_requires_an_admin() {
    let t = spawn_app("media-guard").await;
    let (status, _) = rpc_post(
        &t.app,
        "media.upload",
        json!({"filename": "x.png", "base64": "AAAA", "mimeType": "image/png"}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
