//! HTTP API server (cold path)
//!
//! Thin request handler: parses one or two symbols plus a like flag,
//! resolves the client IP, drives the like coordinator and the quote
//! client, and shapes the response. Generic over the ticker store so the
//! whole stack monomorphizes; no dynamic dispatch.

use axum::{
    extract::{ConnectInfo, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{StockQuery, UNKNOWN_IP};
use crate::likes::LikeCoordinator;
use crate::lookup::QuoteClient;
use crate::store::TickerStore;
use crate::{ApiConfig, Result, StockError};

/// Single-stock response body
#[derive(Debug, Serialize, PartialEq)]
pub struct StockData {
    pub stock: String,
    pub price: Decimal,
    pub likes: u64,
}

/// Per-stock entry of a two-stock comparison
#[derive(Debug, Serialize, PartialEq)]
pub struct RelativeStockData {
    pub stock: String,
    pub price: Decimal,
    pub rel_likes: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StockPayload {
    Single(StockData),
    Pair([RelativeStockData; 2]),
}

/// Response envelope
#[derive(Debug, Serialize)]
struct StockResponse {
    #[serde(rename = "stockData")]
    stock_data: StockPayload,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState<S: TickerStore + Clone> {
    pub store: S,
    pub likes: LikeCoordinator<S>,
    pub quotes: QuoteClient,
}

/// Start the API server
pub async fn start_server<S>(state: AppState<S>, config: &ApiConfig) -> Result<()>
where
    S: TickerStore + Clone + Send + Sync + 'static,
{
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(StockError::Io)?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(StockError::Io)?;

    Ok(())
}

/// Build the router
pub fn router<S>(state: AppState<S>) -> Router
where
    S: TickerStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/stock-prices", get(get_stock_prices::<S>))
        .route("/health", get(health::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for /api/stock-prices
///
/// `?stock=SYM[&stock=SYM2][&like=true]` - likes are applied before the
/// price lookup, so a failed lookup never loses a committed like.
async fn get_stock_prices<S>(
    State(state): State<AppState<S>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> std::result::Result<Json<StockResponse>, StockError>
where
    S: TickerStore + Clone + Send + Sync + 'static,
{
    let (stocks, like) = parse_query(raw.as_deref());
    let query = StockQuery::from_params(&stocks)?;
    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(peer)| peer));

    match query {
        StockQuery::One(symbol) => {
            state.likes.record_like_from_ip(&symbol, &ip, like).await?;

            let quote = state.quotes.fetch_price(&symbol).await?;
            let likes = state.store.like_count(&symbol).await?;

            Ok(Json(StockResponse {
                stock_data: StockPayload::Single(StockData {
                    stock: symbol,
                    price: quote.price,
                    likes,
                }),
            }))
        }
        StockQuery::Two(first, second) => {
            // Like-or-not applies independently to each record, same IP
            state.likes.record_like_from_ip(&first, &ip, like).await?;
            state.likes.record_like_from_ip(&second, &ip, like).await?;

            let (first_quote, second_quote) = tokio::join!(
                state.quotes.fetch_price(&first),
                state.quotes.fetch_price(&second)
            );
            let (first_quote, second_quote) = (first_quote?, second_quote?);

            let first_likes = state.store.like_count(&first).await?;
            let second_likes = state.store.like_count(&second).await?;

            Ok(Json(StockResponse {
                stock_data: StockPayload::Pair(shape_pair(
                    (first, first_quote.price, first_likes),
                    (second, second_quote.price, second_likes),
                )),
            }))
        }
    }
}

/// Handler for /health - liveness probe via a store round-trip
async fn health<S>(State(state): State<AppState<S>>) -> impl IntoResponse
where
    S: TickerStore + Clone + Send + Sync + 'static,
{
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok" })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
        }
    }
}

/// Parse repeated `stock` keys and the `like` flag from the raw query.
/// axum's serde Query extractor cannot express repeated keys, so the raw
/// string is parsed directly.
fn parse_query(raw: Option<&str>) -> (Vec<String>, bool) {
    let mut stocks = Vec::new();
    let mut like = false;

    if let Some(raw) = raw {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "stock" => stocks.push(value.into_owned()),
                "like" => like = matches!(value.as_ref(), "true" | "1" | "on"),
                _ => {}
            }
        }
    }

    (stocks, like)
}

/// Resolve the client IP: first X-Forwarded-For hop, else the socket peer,
/// else the shared "unknown" sentinel
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match peer {
        Some(peer) => peer.ip().to_string(),
        None => UNKNOWN_IP.to_string(),
    }
}

/// Pure two-stock shaping: rel_likes of the first entry is the like
/// difference, the second its negation
fn shape_pair(
    first: (String, Decimal, u64),
    second: (String, Decimal, u64),
) -> [RelativeStockData; 2] {
    let rel_likes = first.2 as i64 - second.2 as i64;
    [
        RelativeStockData {
            stock: first.0,
            price: first.1,
            rel_likes,
        },
        RelativeStockData {
            stock: second.0,
            price: second.1,
            rel_likes: -rel_likes,
        },
    ]
}

impl IntoResponse for StockError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StockError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            StockError::Lookup(_) => {
                tracing::error!("price lookup failed: {}", self);
                (StatusCode::BAD_GATEWAY, "price lookup failed".to_string())
            }
            _ => {
                tracing::error!("request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_query_single_with_like() {
        let (stocks, like) = parse_query(Some("stock=GOOG&like=true"));
        assert_eq!(stocks, vec!["GOOG".to_string()]);
        assert!(like);
    }

    #[test]
    fn test_parse_query_repeated_stock_keys() {
        let (stocks, like) = parse_query(Some("stock=GOOG&stock=MSFT"));
        assert_eq!(stocks, vec!["GOOG".to_string(), "MSFT".to_string()]);
        assert!(!like);
    }

    #[test]
    fn test_parse_query_like_variants() {
        assert!(!parse_query(Some("stock=GOOG&like=false")).1);
        assert!(!parse_query(Some("stock=GOOG")).1);
        assert!(parse_query(Some("stock=GOOG&like=1")).1);
        assert!(parse_query(None).0.is_empty());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 9.9.9.9"),
        );
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), "1.2.3.4");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "10.0.0.1");
    }

    #[test]
    fn test_client_ip_unknown_sentinel() {
        assert_eq!(client_ip(&HeaderMap::new(), None), UNKNOWN_IP);
    }

    #[test]
    fn test_shape_pair_symmetry() {
        let price_a = Decimal::new(15025, 2);
        let price_b = Decimal::new(30000, 2);

        let [a, b] = shape_pair(
            ("GOOG".to_string(), price_a, 5),
            ("MSFT".to_string(), price_b, 2),
        );

        assert_eq!(a.rel_likes, 3);
        assert_eq!(b.rel_likes, -3);
        assert_eq!(a.rel_likes, -b.rel_likes);
        assert_eq!(a.stock, "GOOG");
        assert_eq!(b.stock, "MSFT");
    }

    #[test]
    fn test_response_envelope_shapes() {
        let single = StockResponse {
            stock_data: StockPayload::Single(StockData {
                stock: "GOOG".to_string(),
                price: Decimal::new(15025, 2),
                likes: 1,
            }),
        };
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["stockData"]["stock"], "GOOG");
        assert_eq!(json["stockData"]["likes"], 1);

        let pair = StockResponse {
            stock_data: StockPayload::Pair(shape_pair(
                ("GOOG".to_string(), Decimal::new(15025, 2), 5),
                ("MSFT".to_string(), Decimal::new(30000, 2), 2),
            )),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["stockData"][0]["rel_likes"], 3);
        assert_eq!(json["stockData"][1]["rel_likes"], -3);
        assert!(json["stockData"][0].get("likes").is_none());
    }
}
