use concierge_core::tool::{Tool, ToolOutput, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::catalog::{CatalogClient, RatePlanLookup, opaque_id};

#[derive(Deserialize, JsonSchema)]
pub struct RatePlansParameters {
    #[serde(deserialize_with = "opaque_id")]
    #[schemars(
        with = "String",
        description = "The hotel id, taken from a search result or a [hotel_id:..] annotation."
    )]
    hotel_id: String,
    #[serde(rename = "checkIn")]
    #[schemars(description = "Check-in date, YYYY-MM-DD.")]
    check_in: String,
    #[serde(rename = "checkOut")]
    #[schemars(
        description = "Check-out date, YYYY-MM-DD, after the check-in date."
    )]
    check_out: String,
}

/// A tool for looking up the rate plans of a hotel.
pub struct RatePlansTool {
    client: CatalogClient,
    parameter_schema: Value,
}

impl RatePlansTool {
    /// Creates a new rate plan tool.
    #[inline]
    pub fn new(client: CatalogClient) -> Self {
        RatePlansTool {
            client,
            parameter_schema: schema_for!(RatePlansParameters).to_value(),
        }
    }
}

impl Tool for RatePlansTool {
    type Input = RatePlansParameters;

    fn name(&self) -> &str {
        "get_rate_plans"
    }

    fn description(&self) -> &str {
        r#"
Looks up room types, rate plans and prices of one hotel for a stay.
Use the hotel id of a search result, or the id carried by a [hotel_id:..] annotation in the user message."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: RatePlansParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let lookup = client
                .rate_plans(&input.hotel_id, &input.check_in, &input.check_out)
                .await;
            Ok(ToolOutput::text(format_lookup(lookup).to_string()))
        }
    }
}

// Invalid dates are reported as a value for the model to explain, never
// raised as a tool error.
fn format_lookup(lookup: RatePlanLookup) -> Value {
    match lookup {
        RatePlanLookup::Found(value) => value,
        RatePlanLookup::InvalidInput(reason) => json!({ "error": reason }),
        RatePlanLookup::Unavailable => json!({
            "error": "Rate plans are not available right now."
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters() {
        let input: RatePlansParameters = serde_json::from_value(json!({
            "hotel_id": 2,
            "checkIn": "2025-01-01",
            "checkOut": "2025-01-03",
        }))
        .unwrap();
        assert_eq!(input.hotel_id, "2");
        assert_eq!(input.check_in, "2025-01-01");
        assert_eq!(input.check_out, "2025-01-03");

        let tool = RatePlansTool::new(CatalogClient::new(
            crate::catalog::CatalogConfig {
                hotels_url: "http://127.0.0.1:9/hotels".to_owned(),
                rate_plans_url: "http://127.0.0.1:9/rate-plans".to_owned(),
                page_limit: 10,
                max_pages: 1,
                timeout: std::time::Duration::from_secs(1),
            },
        ));
        let properties = &tool.parameter_schema()["properties"];
        assert!(properties.get("checkIn").is_some());
        assert!(properties.get("check_in").is_none());
    }

    #[test]
    fn test_format_lookup() {
        let found = json!({ "rooms": [{ "name": "Deluxe", "price": 4000 }] });
        assert_eq!(format_lookup(RatePlanLookup::Found(found.clone())), found);

        let invalid = format_lookup(RatePlanLookup::InvalidInput(
            "`checkOut` must be after `checkIn`".to_owned(),
        ));
        assert_eq!(invalid["error"], "`checkOut` must be after `checkIn`");

        let unavailable = format_lookup(RatePlanLookup::Unavailable);
        assert!(unavailable["error"].is_string());
    }
}
