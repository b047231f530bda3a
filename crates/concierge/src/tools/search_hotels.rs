use concierge_core::memory::EntityRef;
use concierge_core::tool::{Error as ToolError, Tool, ToolOutput, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{CatalogClient, Hotel};

#[derive(Deserialize, JsonSchema)]
pub struct SearchHotelsParameters {
    #[schemars(
        description = "What to search for: a city, an area or a hotel name."
    )]
    search: String,
}

/// A tool for searching hotels in the catalog.
pub struct SearchHotelsTool {
    client: CatalogClient,
    parameter_schema: Value,
}

impl SearchHotelsTool {
    /// Creates a new hotel search tool.
    #[inline]
    pub fn new(client: CatalogClient) -> Self {
        SearchHotelsTool {
            client,
            parameter_schema: schema_for!(SearchHotelsParameters).to_value(),
        }
    }
}

impl Tool for SearchHotelsTool {
    type Input = SearchHotelsParameters;

    fn name(&self) -> &str {
        "search_hotels"
    }

    fn description(&self) -> &str {
        r#"
Searches hotels by city, area or name.
Returns a JSON list of hotels with id, name, address, city, coordinates, amenities and nearby locations, in the order they should be presented."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: SearchHotelsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let search = input.search.trim();
            if search.is_empty() {
                return Err(ToolError::invalid_input()
                    .with_reason("`search` must not be empty"));
            }
            let hotels = client.search_hotels(search).await;
            format_hotels(search, &hotels)
        }
    }
}

fn format_hotels(search: &str, hotels: &[Hotel]) -> ToolResult {
    if hotels.is_empty() {
        return Ok(ToolOutput::text(format!(
            "No hotels found for {search:?}. Ask the user to try a different city or keyword."
        )));
    }
    let content = serde_json::to_string(hotels).map_err(|err| {
        ToolError::execution_error().with_reason(err.to_string())
    })?;
    let entities = hotels
        .iter()
        .map(|hotel| EntityRef::new(&hotel.id, hotel.display_name()))
        .collect();
    Ok(ToolOutput::text(content).with_entities(entities))
}
