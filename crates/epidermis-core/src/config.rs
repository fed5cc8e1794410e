//! Configuration loading and typed config structures for the epidermis
//! simulation.
//!
//! Configuration is a single YAML document. Every section and every field is
//! optional and falls back to the defaults of the reference model: 200 stem
//! cells of diameter 2 seeded in `[0, 250)`, bounded space, one step.
//!
//! Once loaded, a config is treated as immutable.

use std::path::Path;

use serde::Deserialize;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "EPIDERMIS_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, spatial bound).
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Substrate growth and division parameters.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// Run length.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `EPIDERMIS_SEED`, when set to an unsigned integer, overrides
    /// `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if it fails [`SimulationConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if it fails [`SimulationConfig::validate`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `EPIDERMIS_SEED` is set but is
    /// not an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(SEED_ENV_VAR) {
            self.world.seed = raw.trim().parse().map_err(|_parse_err| ConfigError::Invalid {
                reason: format!("{SEED_ENV_VAR} must be an unsigned integer, got {raw:?}"),
            })?;
        }
        Ok(())
    }

    /// Check that the configuration describes a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for non-finite or inverted bounds, a
    /// negative agent count, a non-positive initial diameter, or a negative
    /// growth rate or jitter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.world.min_bound, self.world.max_bound);
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(invalid(format!(
                "world bound must be finite with min < max, got [{min}, {max}]"
            )));
        }
        if self.population.initial_agents < 0 {
            return Err(invalid(format!(
                "population.initial_agents must be non-negative, got {}",
                self.population.initial_agents
            )));
        }
        let diameter = self.population.initial_diameter;
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(invalid(format!(
                "population.initial_diameter must be positive, got {diameter}"
            )));
        }
        let rate = self.growth.rate;
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(invalid(format!(
                "growth.rate must be non-negative, got {rate}"
            )));
        }
        let jitter = self.growth.division_jitter;
        if !(jitter.is_finite() && jitter >= 0.0) {
            return Err(invalid(format!(
                "growth.division_jitter must be non-negative, got {jitter}"
            )));
        }
        Ok(())
    }
}

/// Shorthand for a [`ConfigError::Invalid`].
const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lower bound of the simulation space on every axis.
    #[serde(default = "default_min_bound")]
    pub min_bound: f64,

    /// Upper bound of the simulation space on every axis.
    #[serde(default = "default_max_bound")]
    pub max_bound: f64,

    /// Whether positions are clamped into the bound after every step.
    #[serde(default = "default_true")]
    pub bound_space: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            min_bound: default_min_bound(),
            max_bound: default_max_bound(),
            bound_space: true,
        }
    }
}

/// Initial population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of stem cells seeded at start.
    ///
    /// Signed so that a negative value in the file is reported rather than
    /// rejected as a type error.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: i64,

    /// Diameter of every seeded cell.
    #[serde(default = "default_initial_diameter")]
    pub initial_diameter: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            initial_diameter: default_initial_diameter(),
        }
    }
}

/// Substrate growth and division parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GrowthConfig {
    /// Diameter added to every cell each step.
    #[serde(default = "default_growth_rate")]
    pub rate: f64,

    /// Extra daughter displacement, as a fraction of the daughter radius.
    #[serde(default = "default_division_jitter")]
    pub division_jitter: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            rate: default_growth_rate(),
            division_jitter: default_division_jitter(),
        }
    }
}

/// Run length configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of steps to run.
    #[serde(default = "default_steps")]
    pub steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("epidermis")
}

const fn default_seed() -> u64 {
    42
}

const fn default_min_bound() -> f64 {
    0.0
}

const fn default_max_bound() -> f64 {
    250.0
}

const fn default_initial_agents() -> i64 {
    200
}

const fn default_initial_diameter() -> f64 {
    epidermis_world::DEFAULT_INITIAL_DIAMETER
}

const fn default_growth_rate() -> f64 {
    2.5
}

const fn default_division_jitter() -> f64 {
    0.5
}

const fn default_steps() -> u64 {
    1
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}
