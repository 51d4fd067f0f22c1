//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures::{Stream, StreamExt};
use tower_http::services::ServeDir;
use tracing::{debug, error, warn};

use crate::catalog::{CatalogError, is_valid_record_id};
use crate::domain::{ResolvedInstant, Ticket, countdown, evaluate};
use crate::ticker::{CountdownTicker, countdown_stream};

use super::auth::RiderToken;
use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<std::path::Path>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/countdown", get(evaluate_countdown))
        .route("/api/tickets/:id/countdown", get(ticket_countdown))
        .route("/api/tickets/:id/countdown/stream", get(ticket_countdown_stream))
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/:id/countdown/stream", get(booking_countdown_stream))
        .route("/tickets/:id", get(ticket_page))
        .route("/bookings", get(bookings_page))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Evaluate an arbitrary departure string against the current time.
async fn evaluate_countdown(
    State(state): State<AppState>,
    Query(req): Query<CountdownRequest>,
) -> Json<CountdownResponse> {
    let now = state.local_now();
    let (resolved, countdown) = evaluate(req.departure.as_deref(), &now);

    if resolved.is_unparseable() {
        debug!(departure = ?req.departure, "unparseable departure time");
    }

    Json(CountdownResponse::new(req.departure, resolved, countdown))
}

/// Countdown for a single ticket.
async fn ticket_countdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TicketCountdownResponse>, AppError> {
    let ticket = fetch_ticket(&state, &id).await?;

    let now = state.local_now();
    let resolved = ticket.resolve_departure(&now);
    let countdown = countdown(resolved, &now);

    Ok(Json(TicketCountdownResponse::from_ticket(
        &ticket, resolved, countdown,
    )))
}

/// Live countdown for a ticket, as server-sent events.
///
/// The departure is resolved once, when the stream opens. The ticker stops
/// when the client disconnects or after the expired event is sent.
async fn ticket_countdown_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let ticket = fetch_ticket(&state, &id).await?;

    let resolved = ticket.resolve_departure(&state.local_now());
    Ok(countdown_events(&state, resolved))
}

/// Live countdown for one of the rider's bookings, as server-sent events.
async fn booking_countdown_stream(
    State(state): State<AppState>,
    rider: RiderToken,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    if !is_valid_record_id(&id) {
        return Err(AppError::BadRequest {
            message: format!("Invalid booking id: {id}"),
        });
    }
    let booking = state.catalog.booking(&id, rider.as_str()).await?;

    let resolved = booking.resolve_departure(&state.local_now());
    Ok(countdown_events(&state, resolved))
}

/// Start a ticker for `resolved` and stream its countdowns as `countdown`
/// events. The ticker lives as long as the response.
fn countdown_events(
    state: &AppState,
    resolved: ResolvedInstant,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>> + use<>> {
    let ticker = CountdownTicker::start(resolved, state.clock.clone(), state.tick);

    let events = countdown_stream(ticker)
        .map(|countdown| Event::default().event("countdown").json_data(countdown));

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// A rider's bookings, each with its countdown.
async fn list_bookings(
    State(state): State<AppState>,
    rider: RiderToken,
    Query(req): Query<BookingsRequest>,
) -> Result<Json<BookingsResponse>, AppError> {
    let email = validate_email(&req.email)?;
    let bookings = state.catalog.bookings_for(email, rider.as_str()).await?;

    let now = state.local_now();
    let bookings = bookings
        .iter()
        .map(|b| {
            let resolved = b.resolve_departure(&now);
            BookingResult::from_booking(b, resolved, countdown(resolved, &now))
        })
        .collect();

    Ok(Json(BookingsResponse { bookings }))
}

/// Ticket detail fragment.
async fn ticket_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let ticket = fetch_ticket(&state, &id).await?;

    let now = state.local_now();
    let countdown = countdown(ticket.resolve_departure(&now), &now);

    let template = TicketDetailTemplate {
        ticket: TicketView::from_ticket(&ticket, &countdown),
    };
    render(&template)
}

/// My-bookings fragment.
async fn bookings_page(
    State(state): State<AppState>,
    rider: RiderToken,
    Query(req): Query<BookingsRequest>,
) -> Result<Html<String>, AppError> {
    let email = validate_email(&req.email)?;
    let bookings = state.catalog.bookings_for(email, rider.as_str()).await?;

    let now = state.local_now();
    let views = bookings
        .iter()
        .map(|b| {
            let departure = b.resolve_departure(&now);
            BookingView::from_booking(b, &countdown(departure, &now))
        })
        .collect();

    render(&BookingListTemplate {
        email: email.to_string(),
        bookings: views,
    })
}

async fn fetch_ticket(state: &AppState, id: &str) -> Result<Ticket, AppError> {
    if !is_valid_record_id(id) {
        return Err(AppError::BadRequest {
            message: format!("Invalid ticket id: {id}"),
        });
    }
    Ok(state.catalog.ticket(id).await?)
}

fn validate_email(email: &str) -> Result<&str, AppError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::BadRequest {
            message: format!("Invalid email: {email}"),
        }),
    }
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {e}"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized { message: String },
    NotFound { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            CatalogError::InvalidId(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            CatalogError::RiderUnauthorized => AppError::Unauthorized {
                message: e.to_string(),
            },
            _ if e.is_upstream() => AppError::Upstream {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
