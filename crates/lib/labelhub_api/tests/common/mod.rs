//! Shared harness: a router over a fresh temp-file database, driven with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use labelhub_api::{AppState, config::ApiConfig};
use labelhub_core::auth::TokenLifetimes;
use labelhub_core::models::auth::{Role, User};
use labelhub_core::models::dataset::{Dataset, DatasetType};
use labelhub_core::models::sample::{NewSample, Sample};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _dir: TempDir,
}

/// Cookies returned by a response, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub cookies: HashMap<String, String>,
}

impl Session {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    /// Raw `Set-Cookie` header values.
    pub set_cookies: Vec<String>,
    pub body: Value,
}

impl TestResponse {
    /// Cookies set by this response, as a session for follow-up requests.
    pub fn session(&self) -> Session {
        let cookies = self
            .set_cookies
            .iter()
            .filter_map(|raw| {
                let pair = raw.split(';').next()?;
                let (name, value) = pair.split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        Session { cookies }
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_lifetimes(TokenLifetimes::default()).await
    }

    pub async fn with_lifetimes(token_lifetimes: TokenLifetimes) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("api.db").display());
        let pool = labelhub_core::db::connect(&url, 8).await.expect("connect");
        labelhub_api::migrate(&pool).await.expect("migrate");

        let config = ApiConfig {
            token_lifetimes,
            ..ApiConfig::new(url)
        };
        let state = AppState::new(pool, config);
        let router = labelhub_api::router(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(COOKIE, session.header());
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request");

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            set_cookies,
            body,
        }
    }

    pub async fn get(&self, uri: &str, session: &Session) -> TestResponse {
        self.request(Method::GET, uri, Some(session), None).await
    }

    pub async fn patch(&self, uri: &str, session: &Session, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(session), Some(body))
            .await
    }

    pub async fn post(&self, uri: &str, session: Option<&Session>, body: Option<Value>) -> TestResponse {
        self.request(Method::POST, uri, session, body).await
    }

    pub async fn user(&self, email: &str, role: Role) -> User {
        labelhub_core::auth::create_account(&self.state.pool, email, PASSWORD, role)
            .await
            .expect("create account")
    }

    /// Log `email` in and return the session cookies.
    pub async fn login(&self, email: &str) -> Session {
        let resp = self
            .post(
                "/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": PASSWORD})),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {:?}", resp.body);
        resp.session()
    }

    pub async fn dataset(&self, name: &str) -> Dataset {
        labelhub_core::datasets::create_dataset(&self.state.pool, name, DatasetType::Entity, None)
            .await
            .expect("create dataset")
    }

    pub async fn samples(&self, dataset_id: i64, count: usize) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(count);
        for i in 0..count {
            samples.push(
                labelhub_core::datasets::add_sample(
                    &self.state.pool,
                    dataset_id,
                    NewSample::unlabeled(format!("sample {i}")),
                )
                .await
                .expect("add sample"),
            );
        }
        samples
    }

    pub async fn grant(&self, user_id: i64, dataset_id: i64) {
        labelhub_core::datasets::permissions::grant_access(&self.state.pool, user_id, dataset_id)
            .await
            .expect("grant");
    }
}
