//! HTTP server for compiled targets and static assets

use std::{
    collections::BTreeMap,
    convert::Infallible,
    path::{Path, PathBuf},
    sync::Arc,
};

use assemble_generator::{Assembly, STATIC_DIR};
use axum::{
    Router,
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::sync::RwLock;
use tower::ServiceExt;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Assembly shared between the server and the rebuild task.
///
/// Rebuilds hold the write lock for the whole compile-and-write pass;
/// requests hold a read lock while their file is opened.
pub type SharedSite = Arc<RwLock<Assembly>>;

/// Create the server router.
///
/// Every route-table entry serves `<output_dir>/<name>`. Requests under
/// `/static` are served from the static asset mirror.
pub fn create_router(
    routes: &BTreeMap<String, String>,
    output_dir: &Path,
    site: SharedSite,
    http_log: bool,
) -> Router {
    let mut router = Router::new();

    for (path, name) in routes {
        if !is_servable(path) {
            tracing::warn!(path = %path, target_name = %name, "skipping route that cannot be served");
            continue;
        }

        let file = output_dir.join(name);
        let site = site.clone();
        router = router.route(
            path,
            get(move |req: Request<Body>| serve_target(site.clone(), file.clone(), req)),
        );
        tracing::debug!(path = %path, target_name = %name, "registered route");
    }

    let static_prefix = format!("/{STATIC_DIR}");
    router = router.nest_service(&static_prefix, ServeDir::new(output_dir.join(STATIC_DIR)));

    if http_log {
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
    }

    router
}

/// Whether a manifest path can be mounted as a plain route.
///
/// Paths must be absolute, carry no route parameters, and stay clear of the
/// static prefix. Segments starting with `:` are rejected as well; axum
/// panics on the old capture syntax.
pub fn is_servable(path: &str) -> bool {
    let static_prefix = format!("/{STATIC_DIR}");
    path.starts_with('/')
        && !path.contains(['{', '}', '*'])
        && !path.split('/').any(|segment| segment.starts_with(':'))
        && path != static_prefix
        && !path.starts_with(&format!("{static_prefix}/"))
}

/// Stream a target's current on-disk bytes.
async fn serve_target(site: SharedSite, file: PathBuf, req: Request<Body>) -> Response {
    let _guard = site.read().await;
    let result: Result<_, Infallible> = ServeFile::new(&file).oneshot(req).await;
    match result {
        Ok(res) => res.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}
