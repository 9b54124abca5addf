use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::service::GameService;
use relay_types::{GameError, SubmitRequest};

pub mod broadcast;
pub mod config;
pub mod registry;
pub mod service;
pub mod websocket;

#[derive(Deserialize)]
struct WsQuery {
    #[serde(rename = "browserId")]
    browser_id: Option<String>,
}

#[derive(Deserialize)]
struct EventQuery {
    name: String,
}

pub fn create_routes(
    service: Arc<GameService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map({
        let service = service.clone();
        move || service.clone()
    });

    // WebSocket endpoint; the browser id rides in as a query parameter and
    // is validated after the upgrade so the client gets a readable error
    // frame instead of a failed handshake.
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(warp::query::<WsQuery>())
        .and(service_filter.clone())
        .map(|ws: warp::ws::Ws, query: WsQuery, service: Arc<GameService>| {
            let browser_id = query.browser_id.unwrap_or_default();
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, browser_id, service))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Connection registry snapshot
    let status = warp::path("status")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_status_request);

    let current_word = warp::path!("api" / "current-word")
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_current_word_request);

    // HTTP fallback for submissions
    let submit = warp::path!("api" / "submit")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_submit_request);

    let rank = warp::path!("api" / "rank" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_rank_request);

    let push_score = warp::path!("api" / "score" / String)
        .and(warp::post())
        .and(service_filter.clone())
        .and_then(handle_push_score_request);

    let broadcast_scores = warp::path!("api" / "broadcast" / "scores")
        .and(warp::post())
        .and(service_filter.clone())
        .and_then(handle_broadcast_scores_request);

    let unicast_event = warp::path!("api" / "event" / String)
        .and(warp::post())
        .and(warp::query::<EventQuery>())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_unicast_event_request);

    let broadcast_event = warp::path!("api" / "broadcast" / "event")
        .and(warp::post())
        .and(warp::query::<EventQuery>())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_broadcast_event_request);

    let disconnect = warp::path!("api" / "disconnect" / String)
        .and(warp::delete())
        .and(service_filter.clone())
        .and_then(handle_disconnect_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    websocket
        .or(health)
        .or(status)
        .or(current_word)
        .or(submit)
        .or(rank)
        .or(push_score)
        .or(broadcast_scores)
        .or(unicast_event)
        .or(broadcast_event)
        .or(disconnect)
        .with(cors)
        .with(warp::log("word_relay"))
}

fn error_reply(error: &GameError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = match error {
        GameError::MissingIdentifier => StatusCode::BAD_REQUEST,
        GameError::PlayerNotFound { .. } => StatusCode::NOT_FOUND,
        GameError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "code": error.code(),
            "message": error.to_string(),
        })),
        status,
    )
}

async fn handle_status_request(
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let status = service.status().await;
    Ok(warp::reply::with_status(
        warp::reply::json(&status),
        StatusCode::OK,
    ))
}

async fn handle_current_word_request(
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.current_word().await {
        Ok(current_word) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "currentWord": current_word })),
            StatusCode::OK,
        )),
        Err(error) => {
            tracing::error!(%error, "failed to read current word");
            Ok(error_reply(&error))
        }
    }
}

async fn handle_submit_request(
    request: SubmitRequest,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.submit(&request.browser_id, &request.word).await {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&outcome),
            StatusCode::OK,
        )),
        Err(error) => {
            tracing::error!(browser_id = request.browser_id, %error, "submission failed");
            Ok(error_reply(&error))
        }
    }
}

async fn handle_rank_request(
    browser_id: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.ranked_score(&browser_id).await {
        Ok(ranked) => Ok(warp::reply::with_status(
            warp::reply::json(&ranked),
            StatusCode::OK,
        )),
        Err(error) => Ok(error_reply(&error)),
    }
}

async fn handle_push_score_request(
    browser_id: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.push_score(&browser_id).await {
        Ok(delivered) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "delivered": delivered })),
            StatusCode::OK,
        )),
        Err(error) => {
            tracing::error!(browser_id, %error, "failed to push score");
            Ok(error_reply(&error))
        }
    }
}

async fn handle_broadcast_scores_request(
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.broadcast_scores().await {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "ok": true })),
            StatusCode::OK,
        )),
        Err(error) => {
            tracing::error!(%error, "failed to broadcast scores");
            Ok(error_reply(&error))
        }
    }
}

async fn handle_unicast_event_request(
    browser_id: String,
    query: EventQuery,
    payload: serde_json::Value,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let delivered = service
        .publish_custom(Some(&browser_id), &query.name, payload)
        .await;
    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "delivered": delivered })),
        StatusCode::OK,
    ))
}

async fn handle_broadcast_event_request(
    query: EventQuery,
    payload: serde_json::Value,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    service.publish_custom(None, &query.name, payload).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "ok": true })),
        StatusCode::OK,
    ))
}

async fn handle_disconnect_request(
    browser_id: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    service.disconnect(&browser_id).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "ok": true })),
        StatusCode::OK,
    ))
}
