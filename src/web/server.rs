use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Path, Query, State},
    http::{request::Parts, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::core::profile::NewUser;
use crate::core::types::{RequestId, UserId};
use crate::email::{dispatch_invitation, EmailSender, LogOnlyMailer, WebhookMailer};
use crate::matching::finder::{MatchFinder, DEFAULT_TOP_N};
use crate::matching::taxonomy::KeywordTaxonomy;
use crate::partnership::error::PartnershipError;
use crate::partnership::manager::PartnershipManager;
use crate::partnership::store::PartnerStore;

/// Request bodies are small JSON documents; anything bigger is abuse
pub const MAX_BODY_SIZE: usize = 64 * 1024; // 64KB

/// Upper bound on the number of suggestions a client may request
pub const MAX_SUGGESTION_LIMIT: usize = 10;

/// Shared application state
pub struct AppState {
    pub manager: PartnershipManager,
    pub taxonomy: KeywordTaxonomy,
    pub mailer: Arc<dyn EmailSender>,
    /// Base URL the invitation registration links point at
    pub frontend_url: String,
}

/// Error response body shared by every endpoint
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Domain error carried to the HTTP boundary
pub struct ApiError(pub PartnershipError);

impl From<PartnershipError> for ApiError {
    fn from(error: PartnershipError) -> Self {
        Self(error)
    }
}

fn error_status(error: &PartnershipError) -> StatusCode {
    match error {
        PartnershipError::AlreadyPartnered
        | PartnershipError::NoPartner
        | PartnershipError::DuplicatePending
        | PartnershipError::InvalidState(_)
        | PartnershipError::EmailTaken
        | PartnershipError::Validation(_) => StatusCode::BAD_REQUEST,
        PartnershipError::NotAuthorized => StatusCode::FORBIDDEN,
        PartnershipError::NotFound(_) => StatusCode::NOT_FOUND,
        PartnershipError::Conflict => StatusCode::CONFLICT,
    }
}

fn error_tag(error: &PartnershipError) -> &'static str {
    match error {
        PartnershipError::AlreadyPartnered => "already_partnered",
        PartnershipError::NoPartner => "no_partner",
        PartnershipError::DuplicatePending => "duplicate_pending",
        PartnershipError::InvalidState(_) => "invalid_state",
        PartnershipError::NotAuthorized => "not_authorized",
        PartnershipError::NotFound(_) => "not_found",
        PartnershipError::EmailTaken => "email_taken",
        PartnershipError::Conflict => "conflict",
        PartnershipError::Validation(_) => "validation_failed",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        let body = ErrorResponse {
            error: self.0.to_string(),
            error_type: error_tag(&self.0).to_string(),
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

/// The verified acting user for a request.
///
/// The bearer token is the opaque access token minted at registration and
/// resolved through the store's token index; user ids are public and never
/// authenticate. This extractor is the seam where a full JWT/OAuth
/// verifier would sit. Handlers never see unauthenticated requests.
pub struct AuthUser(pub UserId);

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Missing or invalid access token".to_string(),
            error_type: "unauthorized".to_string(),
            details: None,
        }),
    )
        .into_response()
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            return Err(unauthorized());
        };

        match state.manager.authenticate(token) {
            Some(user_id) => Ok(Self(user_id)),
            None => Err(unauthorized()),
        }
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server
/// fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Build the shared state for a fresh, empty deployment.
///
/// # Errors
///
/// Returns an error if the embedded taxonomy cannot be loaded.
pub fn build_state(
    frontend_url: String,
    email_endpoint: Option<String>,
) -> anyhow::Result<Arc<AppState>> {
    let taxonomy = KeywordTaxonomy::load_embedded()?;
    let store = Arc::new(PartnerStore::new());
    let mailer: Arc<dyn EmailSender> = match email_endpoint {
        Some(endpoint) => Arc::new(WebhookMailer::new(endpoint)),
        None => Arc::new(LogOnlyMailer),
    };

    Ok(Arc::new(AppState {
        manager: PartnershipManager::new(store),
        taxonomy,
        mailer,
        frontend_url,
    }))
}

/// Create the application router with all routes and middleware configured.
#[allow(clippy::missing_panics_doc)] // Panics only on invalid governor config (constants are valid)
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    // IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .unwrap();

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/match/suggestions", get(suggestions_handler))
        .route("/api/match/request", post(send_request_handler))
        .route("/api/match/requests", get(list_requests_handler))
        .route(
            "/api/match/requests/{request_id}/accept",
            post(accept_request_handler),
        )
        .route(
            "/api/match/requests/{request_id}/reject",
            post(reject_request_handler),
        )
        .route("/api/match/unmatch", post(unmatch_handler))
        .route("/api/match/invite", post(invite_handler))
        .route("/api/partner", get(partner_handler))
        .route("/api/invitations", get(invitations_handler))
        .route("/api/taxonomy", get(taxonomy_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("strict-transport-security"),
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // IP-based rate limiting to prevent abuse
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests
                .layer(ConcurrencyLimitLayer::new(100))
                // JSON bodies only; keep them small
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let state = build_state(args.frontend_url.clone(), args.email_endpoint.clone())?;
    let app = create_router(state);

    let addr = format!("{}:{}", args.address, args.port);
    tracing::info!("Starting wingman server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

// === handlers ===

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    bio: Option<String>,
    invite_token: Option<String>,
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<Response, ApiError> {
    let new_user = NewUser {
        name: body.name,
        email: body.email,
        bio: body.bio,
    };
    let registration = state
        .manager
        .register_user(&new_user, body.invite_token.as_deref())?;

    let response = serde_json::json!({
        // Opaque access token; a production deployment would mint a JWT here
        "token": registration.access_token,
        "user": {
            "id": registration.user.id.0,
            "email": registration.user.email,
            "name": registration.user.name,
            "bio": registration.user.bio,
        },
        "partnership_created": registration.partnership_created,
    });
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[derive(Deserialize)]
struct SuggestionParams {
    limit: Option<usize>,
}

async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TOP_N)
        .clamp(1, MAX_SUGGESTION_LIMIT);

    let (requester, candidates) = state.manager.suggestion_pool(&user)?;

    let finder = MatchFinder::new(&state.taxonomy);
    let matches = finder.find_top_matches(
        &requester.id,
        requester.bio.as_deref(),
        &candidates,
        limit,
    );

    // An empty pool is an empty list, not an error
    let results: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| {
            serde_json::json!({
                "id": m.candidate.id.0,
                "name": m.candidate.name,
                "bio": m.candidate.bio,
                "compatibility_score": m.score.value,
                "member_since": m.candidate.member_since,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({ "matches": results })))
}

#[derive(Deserialize)]
struct SendRequestBody {
    receiver_id: String,
}

async fn send_request_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<SendRequestBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let receiver = UserId::new(body.receiver_id);
    let request = state.manager.send_request(&user, &receiver)?;

    Ok(Json(serde_json::json!({
        "message": "Partnership request sent!",
        "request": {
            "id": request.id.0,
            "sender_id": request.sender.0,
            "receiver_id": request.receiver.0,
            "status": request.status,
            "created_at": request.created_at,
        }
    })))
}

async fn list_requests_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requests = state.manager.pending_requests(&user)?;
    Ok(Json(serde_json::json!({ "requests": requests })))
}

async fn accept_request_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let accepted = state
        .manager
        .accept_request(&RequestId::new(request_id), &user)?;

    Ok(Json(serde_json::json!({
        "message": "Partnership accepted!",
        "partner": accepted.partner,
    })))
}

async fn reject_request_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .manager
        .reject_request(&RequestId::new(request_id), &user)?;
    Ok(Json(
        serde_json::json!({ "message": "Partnership request rejected" }),
    ))
}

async fn unmatch_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.unmatch(&user)?;
    Ok(Json(serde_json::json!({ "message": "Successfully unmatched" })))
}

#[derive(Deserialize)]
struct InviteBody {
    email: String,
}

async fn invite_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<InviteBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitation = state.manager.invite_by_email(&user, &body.email)?;

    let invitation_url = format!(
        "{}/register?invite_token={}",
        state.frontend_url.trim_end_matches('/'),
        invitation.token
    );

    let inviter_name = state
        .manager
        .store()
        .read(|tables| tables.user(&user).map(|record| record.name.clone()))
        .unwrap_or_default();

    // Best-effort delivery after the commit; a failed send never touches
    // the invitation record
    dispatch_invitation(
        state.mailer.clone(),
        invitation.email.clone(),
        inviter_name,
        invitation_url.clone(),
    );

    Ok(Json(serde_json::json!({
        "message": "Invitation sent successfully!",
        "email": invitation.email,
        "invitation_url": invitation_url,
        "email_dispatched": true,
    })))
}

async fn partner_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let partner = state.manager.current_partner(&user)?;
    Ok(Json(serde_json::json!({ "partner": partner })))
}

async fn invitations_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitations = state.manager.sent_invitations(&user)?;
    let results: Vec<serde_json::Value> = invitations
        .iter()
        .map(|invitation| {
            serde_json::json!({
                "id": invitation.id.0,
                "email": invitation.email,
                "status": invitation.status,
                "created_at": invitation.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "invitations": results })))
}

/// Return the goal-category taxonomy used for scoring
async fn taxonomy_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let categories: Vec<serde_json::Value> = state
        .taxonomy
        .categories()
        .iter()
        .map(|category| {
            serde_json::json!({
                "name": category.name,
                "trigger_count": category.triggers.len(),
                "triggers": category.triggers,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": categories.len(),
        "categories": categories,
    }))
}
