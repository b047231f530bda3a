use std::future::ready;

use chrono::{Datelike, Local, NaiveDate};
use concierge_core::tool::{Tool, ToolOutput, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize, JsonSchema)]
pub struct CurrentDateParameters {}

/// A tool for getting today's date, so relative dates like "tomorrow" can
/// be turned into `YYYY-MM-DD`.
pub struct CurrentDateTool {
    parameter_schema: Value,
}

impl CurrentDateTool {
    /// Creates a new current date tool.
    #[inline]
    pub fn new() -> Self {
        CurrentDateTool {
            parameter_schema: schema_for!(CurrentDateParameters).to_value(),
        }
    }
}

impl Default for CurrentDateTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CurrentDateTool {
    type Input = CurrentDateParameters;

    fn name(&self) -> &str {
        "current_date"
    }

    fn description(&self) -> &str {
        r#"
Returns today's date in YYYY-MM-DD format and the day of the week.
Call it before turning relative dates like "today", "tomorrow" or "this weekend" into check-in and check-out dates."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        _input: CurrentDateParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let today = Local::now().date_naive();
        ready(Ok(ToolOutput::text(format_date(today).to_string())))
    }
}

fn format_date(date: NaiveDate) -> Value {
    json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "weekday": date.weekday().to_string(),
    })
}
