mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

fn titles(list: &Value) -> Vec<&str> {
    list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn admin_routes_need_a_live_token() {
    let app = TestApp::new();

    let (status, json) = app
        .call(Method::POST, "/api/teams", None, Some(json!({ "name": "X", "logoUrl": "" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());

    let (status, _) = app
        .call(Method::GET, "/api/auth/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.login().await;
    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], "admin");

    let (status, _) = app
        .call(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_ids_and_bodies_come_back_in_the_envelope() {
    let app = TestApp::new();
    let token = app.login().await;

    let (status, json) = app.get("/api/teams/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, json) = app.get("/api/teams/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Team not found");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/teams")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ \"name\": "))
        .unwrap();
    let (status, json) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = app
        .call(Method::POST, "/api/teams", Some(&token), Some(json!({ "name": "   ", "logoUrl": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, health) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["success"], true);
}

#[tokio::test]
async fn only_one_season_stays_active() {
    let app = TestApp::new();
    let token = app.login().await;

    let (status, _) = app.get("/api/seasons/active").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let first = app.create_season(&token, "2023/24", true).await;
    let second = app.create_season(&token, "2024/25", true).await;

    let (_, active) = app.get("/api/seasons/active").await;
    assert_eq!(active["data"]["id"], second);
    let (_, old) = app.get(&format!("/api/seasons/{first}")).await;
    assert_eq!(old["data"]["isActive"], false);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/seasons/{first}"),
            Some(&token),
            Some(json!({ "isActive": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.get("/api/seasons").await;
    let active: Vec<_> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["isActive"] == true)
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(active, vec![first]);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/seasons",
            Some(&token),
            Some(json!({
                "name": "Backwards",
                "year": 2025,
                "startDate": "2025-09-01",
                "endDate": "2025-05-01",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn news_slugs_stay_unique_and_drafts_stay_hidden() {
    let app = TestApp::new();
    let token = app.login().await;

    let article = json!({
        "title": "Season Opener!",
        "content": "<p>We are back.</p>",
        "tags": ["league", " league ", "home"],
        "status": "published",
    });
    let first = app.create(&token, "/api/news", article.clone()).await;
    let second = app.create(&token, "/api/news", article).await;
    app.create(
        &token,
        "/api/news",
        json!({ "title": "Transfer rumours", "content": "<p>Soon.</p>" }),
    )
    .await;

    let (_, a) = app.get(&format!("/api/news/{first}")).await;
    let (_, b) = app.get(&format!("/api/news/{second}")).await;
    assert_eq!(a["data"]["slug"], "season-opener");
    assert_eq!(b["data"]["slug"], "season-opener-2");
    assert!(a["data"]["publishedAt"].is_string());
    assert_eq!(a["data"]["tags"], json!(["league", "home"]));

    let (_, public) = app.get("/api/news").await;
    assert!(!titles(&public).contains(&"Transfer rumours"));
    assert_eq!(titles(&public).len(), 2);

    let (_, everything) = app
        .call(Method::GET, "/api/news?status=draft", Some(&token), None)
        .await;
    assert_eq!(titles(&everything), vec!["Transfer rumours"]);

    let (status, _) = app.get("/api/news/slug/transfer-rumours").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(Method::GET, "/api/news/slug/transfer-rumours", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, renamed) = app
        .call(
            Method::PATCH,
            &format!("/api/news/{second}"),
            Some(&token),
            Some(json!({ "title": "Home opener" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["data"]["slug"], "home-opener");
}

#[tokio::test]
async fn contact_messages_flow_from_public_form_to_admin() {
    let app = TestApp::new();
    let token = app.login().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({ "name": "Fan", "email": "not-an-email", "message": "Hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .call(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({
                "name": "Fan",
                "email": "fan@example.com",
                "subject": "Tickets",
                "message": "When do tickets go on sale?",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["isRead"], false);
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, _) = app.get("/api/contact").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, unread) = app
        .call(Method::GET, "/api/contact?unread=true", Some(&token), None)
        .await;
    assert_eq!(unread["data"].as_array().unwrap().len(), 1);

    let (status, read) = app
        .call(
            Method::PATCH,
            &format!("/api/contact/{id}"),
            Some(&token),
            Some(json!({ "isRead": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"]["isRead"], true);

    let (_, unread) = app
        .call(Method::GET, "/api/contact?unread=true", Some(&token), None)
        .await;
    assert!(unread["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/contact/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::GET, &format!("/api/contact/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn players_filter_by_season_and_validate_jerseys() {
    let app = TestApp::new();
    let token = app.login().await;
    let season = app.create_season(&token, "2024", true).await;

    let player = |first: &str, jersey: i32, seasons: Vec<i64>| {
        json!({
            "firstName": first,
            "lastName": "Setter",
            "dateOfBirth": "1998-04-12",
            "height": 192.5,
            "position": "Setter",
            "jerseyNumber": jersey,
            "nationality": "Finland",
            "imageUrl": "/uploads/p.png",
            "featured": jersey == 7,
            "seasonIds": seasons,
        })
    };

    app.create(&token, "/api/players", player("Aino", 7, vec![season])).await;
    app.create(&token, "/api/players", player("Eero", 3, vec![])).await;

    let (status, _) = app
        .call(Method::POST, "/api/players", Some(&token), Some(player("Max", 100, vec![])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = app.get("/api/players").await;
    let names: Vec<_> = all["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Eero", "Aino"]);

    let (_, in_season) = app.get(&format!("/api/players?season={season}")).await;
    assert_eq!(in_season["data"].as_array().unwrap().len(), 1);
    assert_eq!(in_season["data"][0]["seasonIds"], json!([season]));

    let (_, featured) = app.get("/api/players?featured=true").await;
    assert_eq!(featured["data"][0]["firstName"], "Aino");
}

#[tokio::test]
async fn sponsors_are_grouped_by_tier() {
    let app = TestApp::new();
    let token = app.login().await;

    for (name, tier) in [("Zeta Oy", "gold"), ("Alpha Ab", "silver"), ("Beta Ltd", "gold")] {
        app.create(
            &token,
            "/api/sponsors",
            json!({ "name": name, "logoUrl": "/uploads/s.png", "tier": tier }),
        )
        .await;
    }

    let (_, gold) = app.get("/api/sponsors?tier=gold").await;
    let names: Vec<_> = gold["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Beta Ltd", "Zeta Oy"]);
}

#[tokio::test]
async fn explicit_null_clears_optional_fields() {
    let app = TestApp::new();
    let token = app.login().await;

    let season = app
        .create(
            &token,
            "/api/seasons",
            json!({
                "name": "2024/25",
                "year": 2024,
                "startDate": "2024-09-01",
                "endDate": "2025-05-31",
            }),
        )
        .await;
    let (status, json) = app
        .call(
            Method::PATCH,
            &format!("/api/seasons/{season}"),
            Some(&token),
            Some(json!({ "startDate": null, "endDate": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(json["data"]["startDate"].is_null());
    assert!(json["data"]["endDate"].is_null());

    // Absent fields stay untouched.
    let (_, json) = app
        .call(
            Method::PATCH,
            &format!("/api/seasons/{season}"),
            Some(&token),
            Some(json!({ "endDate": "2025-06-30" })),
        )
        .await;
    assert_eq!(json["data"]["endDate"], "2025-06-30");
    let (_, json) = app
        .call(
            Method::PATCH,
            &format!("/api/seasons/{season}"),
            Some(&token),
            Some(json!({ "name": "Renamed" })),
        )
        .await;
    assert_eq!(json["data"]["endDate"], "2025-06-30");

    let article = app
        .create(
            &token,
            "/api/news",
            json!({ "title": "Photo day", "content": "<p>Smile.</p>", "imageUrl": "/uploads/a.png" }),
        )
        .await;
    let (status, json) = app
        .call(
            Method::PATCH,
            &format!("/api/news/{article}"),
            Some(&token),
            Some(json!({ "imageUrl": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(json["data"]["imageUrl"].is_null());

    let player = app
        .create(
            &token,
            "/api/players",
            json!({
                "firstName": "Aino",
                "lastName": "Setter",
                "dateOfBirth": "1998-04-12",
                "height": 180.0,
                "position": "Setter",
                "jerseyNumber": 7,
                "nationality": "Finland",
                "imageUrl": "/uploads/p.png",
                "bio": "Captain since 2020.",
            }),
        )
        .await;
    let (status, json) = app
        .call(
            Method::PATCH,
            &format!("/api/players/{player}"),
            Some(&token),
            Some(json!({ "bio": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(json["data"]["bio"].is_null());

    let sponsor = app
        .create(
            &token,
            "/api/sponsors",
            json!({ "name": "Zeta Oy", "logoUrl": "/uploads/s.png", "website": "https://zeta.example", "tier": "gold" }),
        )
        .await;
    let (_, json) = app
        .call(
            Method::PATCH,
            &format!("/api/sponsors/{sponsor}"),
            Some(&token),
            Some(json!({ "website": null })),
        )
        .await;
    assert!(json["data"]["website"].is_null());
}

#[tokio::test]
async fn uploaded_images_are_served_back() {
    let app = TestApp::new();
    let token = app.login().await;

    let multipart = |file_name: &str| {
        let boundary = "volley-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             not really an image\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    };

    let (status, _) = app.send(multipart("script.sh")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app.send(multipart("logo.png")).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let url = json["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let file_name = url.trim_start_matches("/uploads/");
    assert!(app.uploads.path().join(file_name).exists());

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
