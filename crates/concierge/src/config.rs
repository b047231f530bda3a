//! Environment-driven configuration.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use concierge_core::DEFAULT_MAX_TOOL_ROUNDS;
use concierge_core::conversation::DEFAULT_HISTORY_CAPACITY;
use concierge_openai_model::{OpenAIConfig, OpenAIConfigBuilder};
use thiserror::Error;

use crate::catalog::CatalogConfig;
use crate::deals::{DEFAULT_DEALS_LIMIT, DealsConfig};

/// The deals endpoint used when `DEALS_URL` is not set.
pub const DEFAULT_DEALS_URL: &str = "https://apideals.ghumloo.com/api/categoryWiseDeals?&min=0&max=2000&price=min&page=1&limit=100";

const DEFAULT_PAGE_LIMIT: u32 = 50;
const DEFAULT_MAX_PAGES: u32 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Errors raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    /// A variable is set but cannot be parsed.
    #[error("environment variable `{name}` is invalid: {reason}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Settings of the language model.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// The API key.
    pub api_key: String,
    /// The OpenAI-compatible base URL, `None` for the default endpoint.
    pub base_url: Option<String>,
    /// The model name, `None` for the default model.
    pub model: Option<String>,
    /// The completion limit, `None` for the default limit.
    pub max_tokens: Option<u32>,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Everything the application needs to start.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Language model settings.
    pub llm: LlmSettings,
    /// Catalog service settings.
    pub catalog: CatalogConfig,
    /// Deals service settings.
    pub deals: DealsConfig,
    /// Number of turns the model sees.
    pub history_capacity: usize,
    /// How many tool rounds one utterance may take.
    pub max_tool_rounds: usize,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value
    /// of a variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .ok_or(ConfigError::MissingVar("LLM_API_KEY"))?;
        let llm = LlmSettings {
            api_key,
            base_url: get("LLM_BASE_URL"),
            model: get("LLM_MODEL"),
            max_tokens: parse_opt(get("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS")?,
        };

        let timeout = Duration::from_secs(parse_or(
            get("HTTP_TIMEOUT_SECS"),
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        let catalog = CatalogConfig {
            hotels_url: get("CATALOG_HOTELS_URL")
                .ok_or(ConfigError::MissingVar("CATALOG_HOTELS_URL"))?,
            rate_plans_url: get("CATALOG_RATE_PLANS_URL")
                .ok_or(ConfigError::MissingVar("CATALOG_RATE_PLANS_URL"))?,
            page_limit: parse_or(
                get("CATALOG_PAGE_LIMIT"),
                "CATALOG_PAGE_LIMIT",
                DEFAULT_PAGE_LIMIT,
            )?,
            max_pages: parse_or(
                get("CATALOG_MAX_PAGES"),
                "CATALOG_MAX_PAGES",
                DEFAULT_MAX_PAGES,
            )?,
            timeout,
        };
        if catalog.max_pages == 0 {
            return Err(ConfigError::InvalidVar {
                name: "CATALOG_MAX_PAGES",
                reason: "must be at least 1".to_owned(),
            });
        }

        let deals = DealsConfig {
            url: get("DEALS_URL").unwrap_or_else(|| DEFAULT_DEALS_URL.to_owned()),
            limit: DEFAULT_DEALS_LIMIT,
            timeout,
        };

        Ok(Self {
            llm,
            catalog,
            deals,
            history_capacity: parse_or(
                get("HISTORY_CAPACITY"),
                "HISTORY_CAPACITY",
                DEFAULT_HISTORY_CAPACITY,
            )?,
            max_tool_rounds: parse_or(
                get("MAX_TOOL_ROUNDS"),
                "MAX_TOOL_ROUNDS",
                DEFAULT_MAX_TOOL_ROUNDS,
            )?,
        })
    }

    /// Returns the configuration of the model provider.
    pub fn openai_config(&self) -> OpenAIConfig {
        let mut builder = OpenAIConfigBuilder::with_api_key(&self.llm.api_key);
        if let Some(base_url) = &self.llm.base_url {
            builder = builder.with_base_url(base_url);
        }
        if let Some(model) = &self.llm.model {
            builder = builder.with_model(model);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            builder = builder.with_max_tokens(max_tokens);
        }
        builder.build()
    }
}

fn parse_opt<T>(
    value: Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse().map_err(|err: T::Err| ConfigError::InvalidVar {
                name,
                reason: err.to_string(),
            })
        })
        .transpose()
}

fn parse_or<T>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    Ok(parse_opt(value, name)?.unwrap_or(default))
}
