use crate::constants::{
    COORDINATE_SCALE, DEFAULT_EAST, DEFAULT_MAX_PRICE, DEFAULT_NORTH, DEFAULT_SOUTH, DEFAULT_WEST,
    GEOCODER_API_KEY_ENV, GEOCODER_URL, LISTING_SOURCE_URL, PARCEL_REGISTRY_URL, TAX_ASSESSMENT_URL,
    USER_AGENT,
};
use crate::error::{Result, ScraperError};
use crate::parser::CoordinateFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub listing_source: ListingSourceConfig,
    pub geocoder: GeocoderConfig,
    pub parcel_registry: ParcelRegistryConfig,
    pub retry: RetryConfig,
    pub tax_assessment: TaxAssessmentConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_price: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

/// Search rectangle in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            west: DEFAULT_WEST,
            south: DEFAULT_SOUTH,
            east: DEFAULT_EAST,
            north: DEFAULT_NORTH,
        }
    }
}

impl BoundingBox {
    /// `rect` query value: each corner scaled to the listing source's integer encoding.
    pub fn to_rect_param(&self) -> String {
        let scale = |deg: f64| (deg * COORDINATE_SCALE).round() as i64;
        format!(
            "{},{},{},{}",
            scale(self.west),
            scale(self.south),
            scale(self.east),
            scale(self.north)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSourceConfig {
    pub url: String,
    #[serde(flatten)]
    pub coordinate_format: CoordinateFormat,
    pub bounding_box: BoundingBox,
}

impl Default for ListingSourceConfig {
    fn default() -> Self {
        Self {
            url: LISTING_SOURCE_URL.to_string(),
            coordinate_format: CoordinateFormat::default(),
            bounding_box: BoundingBox::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: GEOCODER_URL.to_string(),
            api_key_env: GEOCODER_API_KEY_ENV.to_string(),
        }
    }
}

impl GeocoderConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelRegistryConfig {
    pub url: String,
    /// Pause after each listing's registry work, and the floor for a registry retry delay.
    pub rate_limit_ms: u64,
}

impl Default for ParcelRegistryConfig {
    fn default() -> Self {
        Self {
            url: PARCEL_REGISTRY_URL.to_string(),
            rate_limit_ms: 1000,
        }
    }
}

/// Retries for `Transient` geocoder, registry and tax lookups. Off unless `max_retries > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxAssessmentConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for TaxAssessmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: TAX_ASSESSMENT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub file_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            file_name: None,
        }
    }
}

impl OutputConfig {
    /// Configured file, or `listings_<timestamp>.csv` under the output directory.
    pub fn resolve_path(&self) -> PathBuf {
        let file_name = self.file_name.clone().unwrap_or_else(|| {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            format!("listings_{timestamp}.csv")
        });
        Path::new(&self.directory).join(file_name)
    }
}

impl Config {
    /// Load `path`, or built-in defaults if `path` is `None` and `config.toml` is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let bbox = &self.listing_source.bounding_box;
        if bbox.west >= bbox.east || bbox.south >= bbox.north {
            return Err(ScraperError::Config(format!(
                "bounding box must satisfy west < east and south < north, got {bbox:?}"
            )));
        }
        let format = &self.listing_source.coordinate_format;
        if format.lat_integer_digits == 0 || format.lon_integer_digits == 0 {
            return Err(ScraperError::Config(
                "coordinate integer digit counts must be at least 1".into(),
            ));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ScraperError::Config("http.timeout_seconds must be at least 1".into()));
        }
        Ok(())
    }
}
