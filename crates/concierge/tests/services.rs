mod common;

use std::sync::atomic::Ordering;

use common::FakeServices;
use concierge::catalog::{CatalogClient, RatePlanLookup};
use serde_json::json;

#[tokio::test]
async fn test_search_hotels_follows_pages() {
    let services = FakeServices::start().await;
    let catalog = services.catalog();

    let hotels = catalog.search_hotels("goa").await;
    let names: Vec<_> = hotels.iter().map(|h| h.display_name()).collect();
    assert_eq!(names, ["Hotel Alpha", "Hotel Beta", "Taj Palace"]);
    // The failing third page ends the search with what was collected.
    assert_eq!(services.hits.hotels.load(Ordering::SeqCst), 3);

    let value = serde_json::to_value(&hotels[0]).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object["id"], "1");
    assert!(!object.contains_key("owner_phone"));
    assert!(!object.contains_key("commission_percent"));
}

#[tokio::test]
async fn test_search_hotels_skips_malformed_records() {
    let services = FakeServices::start().await;
    let catalog = services.catalog();

    let hotels = catalog.search_hotels("mixed").await;
    let names: Vec<_> = hotels.iter().map(|h| h.display_name()).collect();
    assert_eq!(names, ["Hotel Alpha", "Taj Palace", "Lemon Tree"]);
    assert_eq!(services.hits.hotels.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_hotels_page_bound() {
    let services = FakeServices::start().await;
    let catalog = CatalogClient::new(services.catalog_config(1));

    let hotels = catalog.search_hotels("goa").await;
    assert_eq!(hotels.len(), 2);
    assert_eq!(services.hits.hotels.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_hotels_no_results() {
    let services = FakeServices::start().await;
    let catalog = services.catalog();

    assert!(catalog.search_hotels("atlantis").await.is_empty());
    assert!(catalog.search_hotels("closed").await.is_empty());
    assert!(catalog.search_hotels("broken").await.is_empty());
    assert!(catalog.search_hotels("slow").await.is_empty());
}

#[tokio::test]
async fn test_rate_plans() {
    let services = FakeServices::start().await;
    let catalog = services.catalog();

    let lookup = catalog.rate_plans("2", "2025-01-01", "2025-01-03").await;
    let RatePlanLookup::Found(value) = &lookup else {
        panic!("unexpected lookup: {lookup:?}");
    };
    assert_eq!(value["hotel_id"], "2");
    assert_eq!(value["checkIn"], "2025-01-01");
    assert_eq!(value["checkOut"], "2025-01-03");

    let lookup = catalog.rate_plans("500", "2025-01-01", "2025-01-03").await;
    assert_eq!(lookup, RatePlanLookup::Unavailable);
}

#[tokio::test]
async fn test_rate_plans_invalid_input() {
    let services = FakeServices::start().await;
    let catalog = services.catalog();

    let lookup = catalog.rate_plans("2", "tomorrow", "2025-01-03").await;
    assert!(matches!(lookup, RatePlanLookup::InvalidInput(_)));
    let lookup = catalog.rate_plans("2", "2025-01-03", "2025-01-01").await;
    assert!(matches!(lookup, RatePlanLookup::InvalidInput(_)));
    let lookup = catalog.rate_plans(" ", "2025-01-01", "2025-01-03").await;
    assert!(matches!(lookup, RatePlanLookup::InvalidInput(_)));

    // Invalid input never reaches the service.
    assert_eq!(services.hits.rate_plans.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_deals() {
    let services = FakeServices::start().await;
    let deals = services.deals();

    let found = deals.search("club gurugram").await;
    assert_eq!(found.len(), 1);
    assert_eq!(
        serde_json::to_value(&found[0]).unwrap(),
        json!({
            "category_name": "Club",
            "name": "Skybar",
            "address": "MG Road",
            "city": "Gurugram",
            "price": 1499,
            "person": 2,
        })
    );

    let mixed = deals.search("mixed").await;
    let names: Vec<_> = mixed.iter().map(|d| d.name.as_deref()).collect();
    assert_eq!(names, [Some("404"), Some("Skybar")]);

    assert!(deals.search("cafe atlantis").await.is_empty());
    assert!(deals.search("broken").await.is_empty());
}
