use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use base64::Engine;
use serde_json::json;

use exif_scrub::config::Config;
use exif_scrub::pipeline::{self, clean_bytes};
use exif_scrub::policy::OutputPolicy;

#[derive(Clone)]
struct AppState {
    policy: OutputPolicy,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // Optional config path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let state = AppState {
        policy: config.policy(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/clean", post(clean_image))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(Extension(state));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {e}"))?;

    log::info!("Listening on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Accept a multipart upload (field `image`), scrub it, and return the
/// cleaned image inline together with the before/after metadata report.
///
/// Each request owns its upload buffer for its lifetime; nothing is written
/// to disk, so there is no shared scratch directory and nothing to clean up.
async fn clean_image(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed multipart body: {e}")))?
    {
        let is_image_field = field.name() == Some("image") || field.file_name().is_some();
        if !is_image_field {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}")))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err((StatusCode::BAD_REQUEST, "No file uploaded!".to_string()));
    };

    log::info!("Cleaning upload: {file_name} ({} bytes)", bytes.len());

    let result = clean_bytes(&bytes, &state.policy).map_err(|e| {
        log::warn!("Failed to clean {file_name}: {e:#}");
        (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}"))
    })?;

    let image = &result.image;
    let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

    Ok(Json(json!({
        "file_name": format!("cleaned_{file_name}"),
        "format": image.format,
        "content_type": image.format.mime_type(),
        "width": image.width,
        "height": image.height,
        "image_base64": image_base64,
        "metadata_before": result.metadata_before.to_json(),
        "metadata_after": pipeline::redacted_summary(&result.metadata_before),
    })))
}
