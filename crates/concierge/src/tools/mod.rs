//! The tools the model uses to look things up.

mod current_date;
mod rate_plans;
mod search_deals;
mod search_hotels;

pub use current_date::CurrentDateTool;
pub use rate_plans::RatePlansTool;
pub use search_deals::SearchDealsTool;
pub use search_hotels::SearchHotelsTool;
