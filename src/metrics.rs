use std::{
    collections::BTreeMap,
    fmt::Write,
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::routes::AppState;

type HttpKey = (String, String, u16);
type GenerateKey = (bool, String);

/// Prometheus-style counters for one application instance
///
/// Constructed explicitly and carried in `AppState`, so independent routers
/// (e.g. in tests) never share counters.
#[derive(Debug)]
pub struct Metrics {
    version: String,
    http_requests: Mutex<BTreeMap<HttpKey, u64>>,
    playlist_generations: Mutex<BTreeMap<GenerateKey, u64>>,
}

impl Metrics {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            http_requests: Mutex::new(BTreeMap::new()),
            playlist_generations: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16) {
        let mut requests = self.http_requests.lock().unwrap_or_else(PoisonError::into_inner);
        *requests
            .entry((method.to_string(), path.to_string(), status))
            .or_default() += 1;
    }

    pub fn record_playlist_generation(&self, success: bool, genre: Option<&str>) {
        let genre = genre.unwrap_or("none").to_string();
        let mut generations = self
            .playlist_generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generations.entry((success, genre)).or_default() += 1;
    }

    #[cfg(test)]
    fn http_request_count(&self, method: &str, path: &str, status: u16) -> u64 {
        let requests = self.http_requests.lock().unwrap_or_else(PoisonError::into_inner);
        requests
            .get(&(method.to_string(), path.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    /// Renders all counters in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP playlister_app_info Application info\n");
        out.push_str("# TYPE playlister_app_info gauge\n");
        let _ = writeln!(
            out,
            "playlister_app_info{{version=\"{}\"}} 1",
            escape_label(&self.version)
        );

        out.push_str("# HELP playlister_http_requests_total Total HTTP requests\n");
        out.push_str("# TYPE playlister_http_requests_total counter\n");
        let requests = self.http_requests.lock().unwrap_or_else(PoisonError::into_inner);
        for ((method, path, status), count) in requests.iter() {
            let _ = writeln!(
                out,
                "playlister_http_requests_total{{method=\"{}\",path=\"{}\",status=\"{}\"}} {}",
                escape_label(method),
                escape_label(path),
                status,
                count
            );
        }
        drop(requests);

        out.push_str("# HELP playlister_playlist_generate_total Total playlist generation requests\n");
        out.push_str("# TYPE playlister_playlist_generate_total counter\n");
        let generations = self
            .playlist_generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for ((success, genre), count) in generations.iter() {
            let _ = writeln!(
                out,
                "playlister_playlist_generate_total{{success=\"{}\",genre=\"{}\"}} {}",
                success,
                escape_label(genre),
                count
            );
        }

        out
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Middleware counting every response by method, route template and status
///
/// Installed as a route layer, so only matched routes reach it.
pub async fn track_metrics(
    State(state): State<Arc<AppState>>,
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();

    let response = next.run(request).await;

    state
        .metrics
        .record_http_request(&method, matched_path.as_str(), response.status().as_u16());

    response
}
