//! A local stand-in for the catalog and deals services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use concierge::catalog::{CatalogClient, CatalogConfig};
use concierge::deals::{DealsClient, DealsConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;

type Params = Query<HashMap<String, String>>;

/// Counts the requests each endpoint received.
#[derive(Default)]
pub struct Hits {
    pub hotels: AtomicUsize,
    pub rate_plans: AtomicUsize,
    pub deals: AtomicUsize,
}

pub struct FakeServices {
    pub base_url: String,
    pub hits: Arc<Hits>,
}

impl FakeServices {
    pub async fn start() -> Self {
        let hits = Arc::new(Hits::default());
        let router = Router::new()
            .route("/hotels", get(hotels))
            .route("/rate-plans", get(rate_plans))
            .route("/deals", get(deals))
            .with_state(Arc::clone(&hits));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn catalog_config(&self, max_pages: u32) -> CatalogConfig {
        CatalogConfig {
            hotels_url: format!("{}/hotels", self.base_url),
            rate_plans_url: format!("{}/rate-plans", self.base_url),
            page_limit: 2,
            max_pages,
            timeout: Duration::from_millis(500),
        }
    }

    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(self.catalog_config(10))
    }

    pub fn deals(&self) -> DealsClient {
        DealsClient::new(DealsConfig {
            url: format!("{}/deals", self.base_url),
            limit: 100,
            timeout: Duration::from_millis(500),
        })
    }
}

fn hotel(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "address": format!("{id} Beach Road"),
        "city": "Goa",
        "latitude": 15.49,
        "longitude": 73.82,
        "amenities": ["Pool", "WiFi"],
        "nearby_locations": ["Baga Beach"],
        "owner_phone": "+91 99999 99999",
        "commission_percent": 18,
    })
}

// "goa" spans three pages, the third of which fails. "mixed" carries a
// record without an id on its first page. "slow" never answers
// in time and "broken" fails right away.
async fn hotels(
    State(hits): State<Arc<Hits>>,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    hits.hotels.fetch_add(1, Ordering::SeqCst);
    let page: u64 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let search = params.get("search").map(String::as_str).unwrap_or_default();

    match (search, page) {
        ("goa", 1) => Ok(Json(json!({
            "success": true,
            "data": [hotel(1, "Hotel Alpha"), hotel(2, "Hotel Beta")],
            "current_page_number": 1,
            "last_page": 4,
        }))),
        ("goa", 2) => Ok(Json(json!({
            "success": true,
            "data": [hotel(3, "Taj Palace")],
            "current_page_number": 2,
            "last_page": 4,
        }))),
        ("goa", _) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        ("mixed", 1) => Ok(Json(json!({
            "success": true,
            "data": [
                hotel(1, "Hotel Alpha"),
                { "name": "Hotel Without Id" },
                hotel(3, "Taj Palace"),
            ],
            "current_page_number": 1,
            "last_page": 2,
        }))),
        ("mixed", _) => Ok(Json(json!({
            "success": true,
            "data": [hotel(4, "Lemon Tree")],
            "current_page_number": 2,
            "last_page": 2,
        }))),
        ("slow", _) => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Json(json!({ "success": true, "data": [hotel(9, "Late")] })))
        }
        ("broken", _) => Err(StatusCode::BAD_GATEWAY),
        ("closed", _) => Ok(Json(json!({ "success": false, "data": [] }))),
        _ => Ok(Json(json!({
            "success": true,
            "data": [],
            "current_page_number": 1,
            "last_page": 1,
        }))),
    }
}

async fn rate_plans(
    State(hits): State<Arc<Hits>>,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    hits.rate_plans.fetch_add(1, Ordering::SeqCst);
    let hotel_id = params.get("hotel_id").ok_or(StatusCode::BAD_REQUEST)?;
    if hotel_id == "500" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({
        "hotel_id": hotel_id,
        "checkIn": params.get("checkIn"),
        "checkOut": params.get("checkOut"),
        "rooms": [{ "name": "Deluxe", "price": 4000 }],
    })))
}

async fn deals(
    State(hits): State<Arc<Hits>>,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    hits.deals.fetch_add(1, Ordering::SeqCst);
    if params.get("limit").map(String::as_str) != Some("100") {
        return Err(StatusCode::BAD_REQUEST);
    }
    match params.get("search").map(String::as_str) {
        Some("broken") => Err(StatusCode::INTERNAL_SERVER_ERROR),
        Some("mixed") => Ok(Json(json!({
            "data": [
                { "name": 404, "city": "Gurugram", "price": 1499 },
                { "name": "Skybar", "city": "Gurugram", "price": 1499 },
            ]
        }))),
        Some(search) if search.contains("club") => Ok(Json(json!({
            "data": [{
                "category_name": "Club",
                "name": "Skybar",
                "address": "MG Road",
                "city": "Gurugram",
                "price": 1499,
                "discounted_price": 999,
                "discount_percentage": 33,
                "person": 2,
            }]
        }))),
        _ => Ok(Json(json!({ "data": [] }))),
    }
}
