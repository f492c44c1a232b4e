use std::sync::Arc;
use warp::Filter;

use crate::service::GameService;
use race_types::ConnectionId;

pub mod config;
pub mod error;
pub mod game_table;
pub mod ledger;
pub mod lobby;
pub mod service;
pub mod session;
pub mod websocket;

pub fn create_routes(
    service: Arc<GameService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map({
        let service = service.clone();
        move || service.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(service_filter.clone())
        .map(|ws: warp::ws::Ws, service| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, service))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Round history of a live session
    let scores = warp::path!("scores" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_scores_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET"]);

    websocket
        .or(health)
        .or(scores)
        .with(cors)
        .with(warp::log("type_race"))
}

async fn handle_scores_request(
    session_id: String,
    service: Arc<GameService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let Ok(id) = session_id.parse::<ConnectionId>() else {
        return Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Invalid session ID format"
            })),
            warp::http::StatusCode::BAD_REQUEST,
        ));
    };

    if !service.sessions().contains(id).await {
        return Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Session not found"
            })),
            warp::http::StatusCode::NOT_FOUND,
        ));
    }

    let scores = service.scores_for(id).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&scores),
        warp::http::StatusCode::OK,
    ))
}
