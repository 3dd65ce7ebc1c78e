use std::collections::HashSet;
use std::env;
use std::time::Duration;

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.2;
const DEFAULT_PLACES_LANGUAGE: &str = "pt-BR";
const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:8080/api/itineraries/shared";
pub const DEFAULT_MAP_SEARCH_BASE_URL: &str = "https://www.google.com/maps/search/";

const GENERATION_TIMEOUT_SECS: u64 = 60;
const PLACES_TIMEOUT_SECS: u64 = 10;
const STORE_TIMEOUT_SECS: u64 = 10;

const DEFAULT_NAME_TOKEN_LEN: usize = 4;

/// Emphasised spans the model likes to use for labels rather than venues.
pub const DEFAULT_STOPLIST: &[&str] = &[
    "tip",
    "tips",
    "note",
    "notes",
    "neighborhood",
    "neighbourhood",
    "duration",
    "morning",
    "afternoon",
    "evening",
    "night",
    "breakfast",
    "lunch",
    "dinner",
    "transport",
    "budget",
    "dica",
    "dicas",
    "bairro",
    "duração",
    "nota",
    "manhã",
    "tarde",
    "noite",
    "almoço",
    "jantar",
];

/// Google place types that never make sense as a sightseeing stop.
pub const DEFAULT_DENIED_CATEGORIES: &[&str] = &[
    "local_government_office",
    "courthouse",
    "police",
    "post_office",
    "storage",
    "moving_company",
    "funeral_home",
    "insurance_agency",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Which acceptance filters are active and with what thresholds.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub stoplist: HashSet<String>,
    pub check_locality: bool,
    pub allowed_categories: Option<HashSet<String>>,
    pub denied_categories: HashSet<String>,
    pub min_reviews: Option<u32>,
    /// Name tokens shorter than this are ignored by the similarity check.
    /// `None` turns the check off.
    pub name_token_len: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            stoplist: DEFAULT_STOPLIST.iter().map(|s| s.to_string()).collect(),
            check_locality: true,
            allowed_categories: None,
            denied_categories: DEFAULT_DENIED_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_reviews: None,
            name_token_len: Some(DEFAULT_NAME_TOKEN_LEN),
        }
    }
}

impl FilterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            stoplist: env_list("VENUE_STOPLIST").unwrap_or(defaults.stoplist),
            check_locality: env_parsed("VENUE_CHECK_LOCALITY").unwrap_or(defaults.check_locality),
            allowed_categories: env_list("VENUE_ALLOWED_CATEGORIES")
                .or(defaults.allowed_categories),
            denied_categories: env_list("VENUE_DENIED_CATEGORIES")
                .unwrap_or(defaults.denied_categories),
            min_reviews: env_parsed::<u32>("VENUE_MIN_REVIEWS")
                .filter(|n| *n > 0)
                .or(defaults.min_reviews),
            name_token_len: match env_parsed::<usize>("VENUE_NAME_TOKEN_LEN") {
                Some(0) => None,
                Some(n) => Some(n),
                None => defaults.name_token_len,
            },
        }
    }
}

/// Settings for the generation pipeline itself.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub filters: FilterConfig,
    /// Drop stoplisted labels while extracting instead of only at filter time.
    pub strip_labels_on_extract: bool,
    pub places_language: String,
    pub map_search_base_url: String,
    pub share_base_url: String,
    pub generation_timeout: Duration,
    pub places_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            strip_labels_on_extract: true,
            places_language: DEFAULT_PLACES_LANGUAGE.to_string(),
            map_search_base_url: DEFAULT_MAP_SEARCH_BASE_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            generation_timeout: Duration::from_secs(GENERATION_TIMEOUT_SECS),
            places_timeout: Duration::from_secs(PLACES_TIMEOUT_SECS),
            store_timeout: Duration::from_secs(STORE_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            filters: FilterConfig::from_env(),
            strip_labels_on_extract: env_parsed("VENUE_EXTRACT_STRIP_LABELS")
                .unwrap_or(defaults.strip_labels_on_extract),
            places_language: env::var("PLACES_LANGUAGE").unwrap_or(defaults.places_language),
            map_search_base_url: env::var("MAP_SEARCH_BASE_URL")
                .unwrap_or(defaults.map_search_base_url),
            share_base_url: env::var("SHARE_BASE_URL").unwrap_or(defaults.share_base_url),
            generation_timeout: env_parsed("GENERATION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.generation_timeout),
            places_timeout: env_parsed("PLACES_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.places_timeout),
            store_timeout: env_parsed("STORE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_timeout),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub openai: OpenAiConfig,
    pub places_api_key: String,
    pub generation: GenerationConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_uri = required("MONGODB_URI")?;
        let openai_api_key = required("OPENAI_API_KEY")?;
        let places_api_key = required("GOOGLE_PLACES_API_KEY")?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: env_parsed("PORT").unwrap_or(PORT),
            mongo_uri,
            openai: OpenAiConfig {
                api_key: openai_api_key,
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
                temperature: env_parsed("OPENAI_TEMPERATURE").unwrap_or(DEFAULT_OPENAI_TEMPERATURE),
            },
            places_api_key,
            generation: GenerationConfig::from_env(),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Comma separated, lower-cased, blanks dropped. Unset means "use the default".
fn env_list(key: &str) -> Option<HashSet<String>> {
    env::var(key).ok().map(|raw| {
        raw.split(',')
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty())
            .collect()
    })
}
