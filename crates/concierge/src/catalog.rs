//! A client of the hotel catalog service.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Settings of the catalog service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// The hotel list endpoint.
    pub hotels_url: String,
    /// The rate plan endpoint.
    pub rate_plans_url: String,
    /// How many hotels to ask for per page.
    pub page_limit: u32,
    /// The maximum number of pages fetched for one search.
    pub max_pages: u32,
    /// The timeout of every request.
    pub timeout: Duration,
}

/// A failed request to an upstream service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent, timed out, or the body could not be
    /// decoded.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// A hotel, reduced to the fields that may be shown to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    /// The provider-assigned identifier.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// The display name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// The street address.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    /// The city.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// The latitude, as the provider sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    /// The longitude, as the provider sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    /// The amenities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Value>,
    /// Places near the hotel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby_locations: Option<Value>,
}

impl Hotel {
    /// Returns the display name, or an empty string if the provider sent
    /// none.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// The outcome of a rate plan lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum RatePlanLookup {
    /// The provider JSON, passed through untouched.
    Found(Value),
    /// The request was rejected before reaching the service.
    InvalidInput(String),
    /// The service could not be reached or failed.
    Unavailable,
}

#[derive(Deserialize)]
struct HotelPage {
    #[serde(default)]
    success: bool,
    #[serde(default, alias = "hotels")]
    data: Vec<Value>,
    #[serde(default)]
    current_page_number: Option<u64>,
    #[serde(default)]
    last_page: Option<u64>,
}

impl HotelPage {
    fn is_last(&self) -> bool {
        match (self.current_page_number, self.last_page) {
            (Some(current), Some(last)) => current >= last,
            _ => true,
        }
    }

    fn into_hotels(self) -> impl Iterator<Item = Hotel> {
        decode_records(self.data)
    }
}

/// Catalog client.
///
/// Failures never surface as errors: a search that fails returns what it
/// collected so far, possibly nothing, and a rate plan lookup that fails
/// returns [`RatePlanLookup::Unavailable`].
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: Client,
    config: Arc<CatalogConfig>,
}

impl CatalogClient {
    /// Creates a new client with the given configuration.
    #[inline]
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Searches hotels, following pagination.
    ///
    /// Pagination stops at the first unsuccessful or empty page, at the
    /// last page reported by the service, or after the configured maximum
    /// number of pages.
    pub async fn search_hotels(&self, search: &str) -> Vec<Hotel> {
        let mut hotels = vec![];
        for page in 1..=self.config.max_pages {
            let hotel_page = match self.fetch_page(search, page).await {
                Ok(hotel_page) => hotel_page,
                Err(err) => {
                    warn!("hotel search stopped at page {page}: {err}");
                    break;
                }
            };
            if !hotel_page.success || hotel_page.data.is_empty() {
                debug!("no more hotels at page {page}");
                break;
            }
            let is_last = hotel_page.is_last();
            hotels.extend(hotel_page.into_hotels());
            if is_last {
                break;
            }
            if page == self.config.max_pages {
                debug!("page limit reached with more pages left");
            }
        }
        debug!("found {} hotels for {search:?}", hotels.len());
        hotels
    }

    /// Looks up the rate plans of a hotel for a stay.
    ///
    /// Dates must be `YYYY-MM-DD` and the check-out must come after the
    /// check-in.
    pub async fn rate_plans(
        &self,
        hotel_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> RatePlanLookup {
        let hotel_id = hotel_id.trim();
        if hotel_id.is_empty() {
            return RatePlanLookup::InvalidInput(
                "`hotel_id` must not be empty".to_owned(),
            );
        }
        let (check_in, check_out) = match validate_stay(check_in, check_out) {
            Ok(stay) => stay,
            Err(reason) => return RatePlanLookup::InvalidInput(reason),
        };

        match self.fetch_rate_plans(hotel_id, check_in, check_out).await {
            Ok(value) => RatePlanLookup::Found(value),
            Err(err) => {
                warn!("rate plan lookup for {hotel_id} failed: {err}");
                RatePlanLookup::Unavailable
            }
        }
    }

    async fn fetch_page(
        &self,
        search: &str,
        page: u32,
    ) -> Result<HotelPage, CatalogError> {
        trace!("fetching hotel page {page} for {search:?}");
        let resp = self
            .client
            .get(&self.config.hotels_url)
            .query(&[("search", search)])
            .query(&[("page", page), ("limit", self.config.page_limit)])
            .timeout(self.config.timeout)
            .send()
            .await?;
        Ok(check_status(resp)?.json().await?)
    }

    async fn fetch_rate_plans(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Value, CatalogError> {
        let check_in = check_in.format(DATE_FORMAT).to_string();
        let check_out = check_out.format(DATE_FORMAT).to_string();
        let resp = self
            .client
            .get(&self.config.rate_plans_url)
            .query(&[
                ("hotel_id", hotel_id),
                ("checkIn", check_in.as_str()),
                ("checkOut", check_out.as_str()),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?;
        Ok(check_status(resp)?.json().await?)
    }
}

pub(crate) fn check_status(resp: Response) -> Result<Response, CatalogError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(CatalogError::Status(status))
    }
}

fn validate_stay(
    check_in: &str,
    check_out: &str,
) -> Result<(NaiveDate, NaiveDate), String> {
    let parse = |name: &str, value: &str| {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
            format!("`{name}` must be a date in YYYY-MM-DD format, got {value:?}")
        })
    };
    let check_in = parse("checkIn", check_in)?;
    let check_out = parse("checkOut", check_out)?;
    if check_out <= check_in {
        return Err("`checkOut` must be after `checkIn`".to_owned());
    }
    Ok((check_in, check_out))
}

/// Decodes each record on its own, skipping the ones that do not fit `T`.
pub(crate) fn decode_records<T: DeserializeOwned>(
    records: Vec<Value>,
) -> impl Iterator<Item = T> {
    records.into_iter().filter_map(|record| {
        serde_json::from_value(record)
            .inspect_err(|err| debug!("skipping malformed record: {err}"))
            .ok()
    })
}

/// Reads a text field, accepting numbers and booleans and treating
/// anything else as absent.
pub(crate) fn lenient_text<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("unexpected identifier: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_hotel_allow_list() {
        let hotel: Hotel = serde_json::from_value(json!({
            "id": 42,
            "name": "Hotel Beta",
            "city": "Goa",
            "latitude": "15.49",
            "longitude": 73.82,
            "amenities": ["Pool", "WiFi"],
            "owner_phone": "+91 99999 99999",
            "commission": 12.5,
        }))
        .unwrap();
        assert_eq!(hotel.id, "42");
        assert_eq!(hotel.display_name(), "Hotel Beta");

        let value = serde_json::to_value(&hotel).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["amenities", "city", "id", "latitude", "longitude", "name"]
        );
    }

    #[test]
    fn test_string_id() {
        let hotel: Hotel =
            serde_json::from_value(json!({ "id": "h-7", "name": null }))
                .unwrap();
        assert_eq!(hotel.id, "h-7");
        assert_eq!(hotel.display_name(), "");

        let err = serde_json::from_value::<Hotel>(json!({ "id": [1] }));
        assert!(err.is_err());
    }

    #[test]
    fn test_malformed_hotels_are_skipped() {
        let page: HotelPage = serde_json::from_value(json!({
            "success": true,
            "data": [
                { "id": 1, "name": "Hotel Alpha" },
                { "name": "Hotel Without Id" },
                { "id": null, "name": "Null Id" },
                { "id": 3, "name": 404, "city": ["Goa"] },
            ],
        }))
        .unwrap();

        let hotels: Vec<_> = page.into_hotels().collect();
        let ids: Vec<_> = hotels.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(hotels[1].display_name(), "404");
        assert_eq!(hotels[1].city, None);
    }

    #[test]
    fn test_page_is_last() {
        let page: HotelPage = serde_json::from_value(json!({
            "success": true,
            "data": [],
            "current_page_number": 2,
            "last_page": 3,
        }))
        .unwrap();
        assert!(!page.is_last());

        let page: HotelPage =
            serde_json::from_value(json!({ "success": true, "hotels": [] }))
                .unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn test_validate_stay() {
        let (check_in, check_out) =
            validate_stay("2025-01-01", " 2025-01-03 ").unwrap();
        assert_eq!(check_in, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(check_out, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());

        let err = validate_stay("01/01/2025", "2025-01-03").unwrap_err();
        assert!(err.contains("checkIn"));
        let err = validate_stay("2025-01-03", "2025-01-03").unwrap_err();
        assert!(err.contains("after"));
        assert!(validate_stay("2025-02-30", "2025-03-01").is_err());
    }
}
