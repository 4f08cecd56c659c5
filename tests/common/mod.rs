// Fake origin for integration tests: serves canned bodies and counts requests per path.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use parking_lot::RwLock;
use tokio::net::TcpListener;

#[derive(Default)]
struct SiteState {
    pages: HashMap<String, Vec<u8>>,
    hits: HashMap<String, usize>,
}

#[derive(Clone, Default)]
pub struct FakeOrigin {
    state: Arc<RwLock<SiteState>>,
}

impl FakeOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with 200 at `path`. Unknown paths answer 404.
    pub fn put(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.state.write().pages.insert(path.to_string(), body.into());
    }

    pub fn remove(&self, path: &str) {
        self.state.write().pages.remove(path);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.read().hits.get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.read().hits.values().sum()
    }

    /// Start serving on a random local port and return the origin URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .fallback(serve_page)
            .with_state(self.state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://127.0.0.1:{}", port)
    }
}

async fn serve_page(State(state): State<Arc<RwLock<SiteState>>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    let mut site = state.write();
    *site.hits.entry(path.clone()).or_insert(0) += 1;
    match site.pages.get(&path) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
