use concierge_core::tool::{Error as ToolError, Tool, ToolOutput, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::deals::{Deal, DealsClient};

#[derive(Deserialize, JsonSchema)]
pub struct SearchDealsParameters {
    #[schemars(
        description = "What to search for, like a city together with an occasion such as club, cafe or birthday party."
    )]
    search: String,
}

/// A tool for searching deals on venues and experiences.
pub struct SearchDealsTool {
    client: DealsClient,
    parameter_schema: Value,
}

impl SearchDealsTool {
    /// Creates a new deal search tool.
    #[inline]
    pub fn new(client: DealsClient) -> Self {
        SearchDealsTool {
            client,
            parameter_schema: schema_for!(SearchDealsParameters).to_value(),
        }
    }
}

impl Tool for SearchDealsTool {
    type Input = SearchDealsParameters;

    fn name(&self) -> &str {
        "search_deals"
    }

    fn description(&self) -> &str {
        r#"
Searches deals on clubs, cafes, restaurants, gaming zones, kids zones and party venues.
Returns a JSON list of deals with category, name, address, city, price and the number of persons."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: SearchDealsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let search = input.search.trim();
            if search.is_empty() {
                return Err(ToolError::invalid_input()
                    .with_reason("`search` must not be empty"));
            }
            let deals = client.search(search).await;
            format_deals(search, &deals)
        }
    }
}

fn format_deals(search: &str, deals: &[Deal]) -> ToolResult {
    if deals.is_empty() {
        return Ok(ToolOutput::text(format!(
            "No deals found for {search:?}. Ask the user to try different keywords."
        )));
    }
    serde_json::to_string(deals)
        .map(ToolOutput::text)
        .map_err(|err| ToolError::execution_error().with_reason(err.to_string()))
}
