//! API service routes

use auth::models::{LoginCredentials, NewUser};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use base64::{Engine, engine::general_purpose::STANDARD};
use common::{database, namespace::validate_filename};
use media::DownloadRequest;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{
        DeleteSongRequest, MessageResponse, SongEntry, SongListResponse, TokenResponse,
        UploadForm, UploadResponse, UploadedFile,
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let protected_routes = Router::new()
        .route("/upload", post(upload).layer(upload_limit))
        .route("/delete_song", delete(delete_song))
        .route("/list_songs", get(list_songs))
        .route("/get_song/:filename", get(get_song))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, label) = if database::health_check(&state.db_pool).await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "soundwave-api"
        })),
    )
}

/// Register a user and create their folder
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUser>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state.user_repository.create(&payload).await?;
    info!("Registered user {} with id {}", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginCredentials>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    let user = state.user_repository.authenticate(&payload).await?;
    let token = state.jwt_service.issue(user.id).map_err(|e| {
        error!("Failed to generate token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(TokenResponse { token }))
}

/// Store the uploaded image and hand the song over to the downloader
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_upload_form(multipart).await?;

    let Some(file) = form.file else {
        return Err(ApiError::BadRequest("File not provided".to_string()));
    };

    let request = DownloadRequest {
        video_link: required(form.video_link, "video_link")?,
        title: required(form.title, "title")?,
        artist: required(form.artist, "artist")?,
        genre: required(form.genre, "genre")?,
        username: user.username,
    };

    let folder = &state.config.upload_folder;
    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|e| ApiError::Io(format!("Failed to create upload folder: {}", e)))?;
    tokio::fs::write(folder.join(&file.filename), &file.bytes)
        .await
        .map_err(|e| ApiError::Io(format!("Failed to save file: {}", e)))?;
    info!("Saved upload {} for user {}", file.filename, request.username);

    let outcome = state.downloader.run(&request).await?;

    Ok(Json(UploadResponse {
        stdout: "Success!".to_string(),
        stderr: outcome.stderr,
    }))
}

/// Delete one song from the caller's folder
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<DeleteSongRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    if payload.filename.is_empty() {
        return Err(ApiError::BadRequest("Filename is required".to_string()));
    }

    state
        .namespaces
        .delete(&user.username, &payload.filename)
        .await?;

    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// List the caller's songs with their tags
pub async fn list_songs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let folder = state.namespaces.resolve(&user.username).await?;
    let filenames = state.namespaces.list(&user.username).await?;
    let extractor = state.metadata_extractor.clone();

    // Tag parsing is blocking file I/O
    let songs = tokio::task::spawn_blocking(move || {
        filenames
            .into_iter()
            .map(|filename| {
                let metadata = extractor.read(&folder.join(&filename));
                let cover_art = metadata.cover_art.as_deref().map(|data| STANDARD.encode(data));
                SongEntry {
                    filename,
                    metadata,
                    cover_art,
                }
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        error!("Song listing task failed: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(SongListResponse { songs }))
}

/// Stream one of the caller's songs
pub async fn get_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.namespaces.file_path(&user.username, &filename).await?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| ApiError::Io(format!("Failed to open file: {}", e)))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::Io(format!("Failed to read file: {}", e)))?
        .len();
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// Acknowledge a logout; tokens stay valid until they expire
pub async fn logout(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    info!("Logout request from user {}", user.username);
    Json(MessageResponse::new("Logout successful"))
}

async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let client_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if client_name.is_empty() {
                    continue;
                }

                // Only the last path component of the client's name is kept
                let filename = std::path::Path::new(&client_name)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or_default()
                    .to_string();
                validate_filename(&filename)?;

                form.file = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "video_link" | "title" | "artist" | "genre" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "video_link" => &mut form.video_link,
                    "title" => &mut form.title,
                    "artist" => &mut form.artist,
                    _ => &mut form.genre,
                };
                *slot = Some(value);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing field: {}", field)))
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::BadRequest(err.body_text())
}
