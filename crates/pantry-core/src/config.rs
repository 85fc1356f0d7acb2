use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("PANTRY_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("pantry.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("pantry.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("pantry.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("pantry.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("PANTRY_").split("__"));

        let config = Self::from_figment(figment);
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Typed settings, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub fusion: FusionSettings,
    pub lexicon: LexiconSettings,
    pub embedding: EmbeddingSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.search.default_k == 0 {
            return Err(Error::InvalidConfig("search.default_k must be positive".into()));
        }
        if self.search.candidate_multiplier == 0 {
            return Err(Error::InvalidConfig("search.candidate_multiplier must be positive".into()));
        }
        let weight = self.fusion.predicate_weight;
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fusion.predicate_weight must be a non-negative number, got {weight}"
            )));
        }
        let default_score = match self.fusion.graph_only_score {
            GraphOnlyScore::MinObserved { floor } => floor,
            GraphOnlyScore::Fixed { value } => value,
        };
        if !default_score.is_finite() {
            return Err(Error::InvalidConfig("fusion.graph_only_score must be finite".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_k: usize,
    /// Vector hits requested per final result slot.
    pub candidate_multiplier: usize,
    /// Upper bound on graph fact lines returned with one response.
    pub max_facts: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_k: 5, candidate_multiplier: 2, max_facts: 50 }
    }
}

/// Knobs of the fusion step.
///
/// `predicate_weight` is added once per satisfied predicate on top of the
/// base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    pub predicate_weight: f32,
    pub graph_only_score: GraphOnlyScore,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self { predicate_weight: 0.1, graph_only_score: GraphOnlyScore::MinObserved { floor: 0.0 } }
    }
}

/// Base score for candidates that only the graph produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphOnlyScore {
    /// Lowest vector similarity among this query's vector candidates, or
    /// `floor` when there were none.
    MinObserved { floor: f32 },
    Fixed { value: f32 },
}

/// Phrase lexicons keyed by canonical value.
///
/// `attributes` maps a tag (`nut-free`) to the phrases that mean it;
/// `categories` maps a category path to its phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSettings {
    pub attributes: BTreeMap<String, Vec<String>>,
    pub categories: BTreeMap<String, Vec<String>>,
}

fn entry(key: &str, phrases: &[&str]) -> (String, Vec<String>) {
    (key.to_string(), phrases.iter().map(|p| p.to_string()).collect())
}

impl Default for LexiconSettings {
    fn default() -> Self {
        let attributes = BTreeMap::from([
            entry("nut-free", &["nut-free", "nut free", "no nuts", "peanut-free", "peanut free"]),
            entry("gluten-free", &["gluten-free", "gluten free"]),
            entry("dairy-free", &["dairy-free", "dairy free", "lactose-free", "lactose free"]),
            entry("low-sodium", &["low sodium", "low-sodium", "reduced sodium", "less sodium"]),
            entry("low-sugar", &["low sugar", "low-sugar", "reduced sugar", "less sugar"]),
            entry("zero-sugar", &["zero sugar", "zero-sugar", "sugar-free", "sugar free", "no sugar", "unsweetened"]),
            entry("high-protein", &["high protein", "high-protein"]),
            entry("vegan", &["vegan", "plant-based", "plant based"]),
            entry("vegetarian", &["vegetarian"]),
            entry("organic", &["organic"]),
            entry("caffeinated", &["caffeinated", "with caffeine"]),
            entry("kids", &["for kids", "kids", "kid-friendly"]),
        ]);
        let categories = BTreeMap::from([
            entry("beverages", &["beverages", "beverage", "drinks"]),
            entry("snacks", &["snacks", "snack"]),
            entry("dairy", &["dairy"]),
            entry("bakery", &["bakery"]),
            entry("frozen", &["frozen"]),
            entry("produce", &["produce"]),
        ]);
        Self { attributes, categories }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dim: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// A CSV file or a directory of CSV files.
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { path: "test_data/catalog".to_string() }
    }
}

impl CatalogSettings {
    pub fn resolved_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Text }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
