#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use volley_site::{build_app, config::Config};

pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let (router, _state) = build_app(Config::in_memory(uploads.path())).unwrap();
        TestApp { router, uploads }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn login(&self) -> String {
        let (status, json) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "admin", "password": "admin" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["data"]["token"].as_str().unwrap().to_string()
    }

    /// POSTs as admin and returns the created id.
    pub async fn create(&self, token: &str, uri: &str, body: Value) -> i64 {
        let (status, json) = self.call(Method::POST, uri, Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{uri}: {json}");
        json["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_team(&self, token: &str, name: &str) -> i64 {
        self.create(
            token,
            "/api/teams",
            json!({ "name": name, "logoUrl": format!("/uploads/{name}.png") }),
        )
        .await
    }

    pub async fn create_season(&self, token: &str, name: &str, active: bool) -> i64 {
        self.create(
            token,
            "/api/seasons",
            json!({ "name": name, "year": 2024, "isActive": active }),
        )
        .await
    }
}

pub fn sets(scores: &[(i32, i32)]) -> Value {
    let sets: Vec<Value> = scores
        .iter()
        .map(|(home, away)| json!({ "home": home, "away": away }))
        .collect();
    json!({ "sets": sets })
}

pub fn completed_match(season: i64, home: i64, away: i64, scores: Value) -> Value {
    json!({
        "seasonId": season,
        "tournament": "Regional League",
        "stage": "Regular season",
        "gameDay": "1",
        "date": "2024-03-10T18:00:00Z",
        "location": "Sports Hall",
        "homeTeamId": home,
        "awayTeamId": away,
        "status": "Completed",
        "scores": scores,
    })
}

pub fn standing_of<'a>(table: &'a Value, team: &str) -> &'a Value {
    table["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["team"]["name"] == team)
        .unwrap_or_else(|| panic!("{team} missing from {table}"))
}
