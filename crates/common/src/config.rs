//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Recipe authoring and listing rules.
    #[serde(default)]
    pub recipes: RecipeConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance (used for short links).
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// What to do when an edge (favorite, cart entry, follow) is added twice or
/// removed while absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglePolicy {
    /// Duplicate add is a conflict, removing an absent edge is not found.
    #[default]
    Strict,
    /// Duplicate add and absent remove are successful no-ops.
    Idempotent,
}

/// How a recipe update that omits ingredients or tags is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialUpdatePolicy {
    /// Missing ingredient or tag lists fail validation.
    #[default]
    Reject,
    /// Missing lists keep the existing associations.
    Preserve,
}

/// Recipe rules as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeConfig {
    /// Minimum cooking time in minutes.
    #[serde(default = "default_min_cooking_time")]
    pub min_cooking_time: i32,
    /// Maximum cooking time in minutes.
    #[serde(default = "default_max_cooking_time")]
    pub max_cooking_time: i32,
    /// Minimum ingredient amount.
    #[serde(default = "default_min_amount")]
    pub min_amount: i32,
    /// Maximum ingredient amount.
    #[serde(default = "default_max_amount")]
    pub max_amount: i32,
    /// Default page size for paginated lists.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Duplicate add / absent remove behaviour for edges.
    #[serde(default)]
    pub toggle_policy: TogglePolicy,
    /// Handling of updates that omit ingredients or tags.
    #[serde(default)]
    pub partial_update: PartialUpdatePolicy,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            min_cooking_time: default_min_cooking_time(),
            max_cooking_time: default_max_cooking_time(),
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
            page_size: default_page_size(),
            toggle_policy: TogglePolicy::default(),
            partial_update: PartialUpdatePolicy::default(),
        }
    }
}

/// Immutable recipe rules handed to services at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeLimits {
    /// Allowed cooking time range (inclusive).
    pub cooking_time: (i32, i32),
    /// Allowed ingredient amount range (inclusive).
    pub amount: (i32, i32),
    /// Default page size.
    pub page_size: u64,
    /// Edge toggle behaviour.
    pub toggle_policy: TogglePolicy,
    /// Partial update behaviour.
    pub partial_update: PartialUpdatePolicy,
}

impl RecipeLimits {
    /// Whether a cooking time is within bounds.
    #[must_use]
    pub fn cooking_time_in_range(&self, minutes: i64) -> bool {
        (i64::from(self.cooking_time.0)..=i64::from(self.cooking_time.1)).contains(&minutes)
    }

    /// Whether an ingredient amount is within bounds.
    #[must_use]
    pub fn amount_in_range(&self, amount: i64) -> bool {
        (i64::from(self.amount.0)..=i64::from(self.amount.1)).contains(&amount)
    }
}

impl Default for RecipeLimits {
    fn default() -> Self {
        RecipeConfig::default().limits()
    }
}

impl RecipeConfig {
    /// Freeze the configured rules.
    #[must_use]
    pub const fn limits(&self) -> RecipeLimits {
        RecipeLimits {
            cooking_time: (self.min_cooking_time, self.max_cooking_time),
            amount: (self.min_amount, self.max_amount),
            page_size: self.page_size,
            toggle_policy: self.toggle_policy,
            partial_update: self.partial_update,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_min_cooking_time() -> i32 {
    1
}

const fn default_max_cooking_time() -> i32 {
    1440
}

const fn default_min_amount() -> i32 {
    1
}

const fn default_max_amount() -> i32 {
    10_000
}

const fn default_page_size() -> u64 {
    6
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` file (if present) into the process environment
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FOODGRAM_ENV`)
    /// 4. Environment variables with `FOODGRAM_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("FOODGRAM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOODGRAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
