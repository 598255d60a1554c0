#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use cron_trigger_api::config::ServerConfig;
use cron_trigger_api::dispatcher::Dispatcher;
use cron_trigger_api::router::build_app_router;
use cron_trigger_api::state::AppState;
use cron_trigger_core::environment::EnvironmentTemplate;
use cron_trigger_core::launcher::Launcher;
use cron_trigger_core::registry::JobRegistry;
use cron_trigger_core::secret::{DisabledSecretProvider, SecretProvider};

/// Build a test `ServerConfig` pointing at temporary directories.
///
/// The secret provider is disabled so tests never shell out to docker.
pub fn test_config(scripts_dir: &Path, log_dir: &Path) -> ServerConfig {
    let scripts = scripts_dir.display().to_string();
    let logs = log_dir.display().to_string();
    ServerConfig::from_lookup(|var| match var {
        "HOST" => Some("127.0.0.1".to_string()),
        "PORT" => Some("9998".to_string()),
        "SCRIPTS_DIR" => Some(scripts.clone()),
        "LOG_DIR" => Some(logs.clone()),
        "SECRET_PROVIDER" => Some("none".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Build the full application router around `registry` and `secrets`.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(
    config: ServerConfig,
    registry: JobRegistry,
    secrets: Arc<dyn SecretProvider>,
) -> Router {
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        secrets,
        EnvironmentTemplate::new(config.secret.env_var.clone(), config.api_base.clone()),
        Launcher::new(config.log_dir.clone()),
    );

    build_app_router(AppState {
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
    })
}

/// App with the built-in registry and no secret provider.
pub fn build_builtin_app(scripts_dir: &Path, log_dir: &Path) -> Router {
    let config = test_config(scripts_dir, log_dir);
    let registry = JobRegistry::builtin(&config.scripts_dir);
    build_test_app(config, registry, Arc::new(DisabledSecretProvider))
}

/// Write a bash script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).expect("create script");
    writeln!(f, "#!/bin/bash").expect("write shebang");
    write!(f, "{body}").expect("write body");
    path
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(json.to_string())).await
}

pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(body)).await
}

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .expect("build request");
    app.oneshot(request).await.expect("oneshot")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Poll `path` until `done` accepts its contents or five seconds pass.
pub async fn wait_for_log(path: &Path, done: impl Fn(&str) -> bool) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        if done(&contents) || Instant::now() > deadline {
            return contents;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
