// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use pvex_collector::Collector;
use pvex_config::METRICS_CONTENT_TYPE;
use pvex_metrics::render_metrics;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

const LANDING_PAGE: &str = "<html><head><title>Proxmox Exporter</title></head>\
<body><h1>Proxmox Exporter</h1><a href=\"/metrics\">Metrics</a></body></html>";

pub(crate) fn router(collector: Arc<Collector>) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(collector)
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Runs one scrape. Upstream failures only shrink the output, so the
/// response is always 200.
async fn metrics(State(collector): State<Arc<Collector>>) -> impl IntoResponse {
    let observations = collector.collect().await;
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], render_metrics(&observations))
}

/// Serves `app` until `shutdown` is cancelled, then drains open requests.
pub(crate) async fn serve(listener: TcpListener, app: Router, shutdown: CancellationToken) -> io::Result<()> {
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, "exporter listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}
