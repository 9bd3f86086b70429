//! Configuration loading for Orchard.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Config file (`--config <path>` or `<orchard_home>/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! Unlike the save file, configuration is validated strictly: a plant whose
//! ideal combo does not have exactly four actions, or two plants sharing an
//! id, stop the program at load time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::action::{ActionType, IdealCombo, REQUIRED_ACTIONS};
use crate::core::scoring::ScoringPolicy;
use crate::error::{OrchardError, Result};

/// Default save document name, shared with earlier builds of the game.
pub const DEFAULT_SAVE_FILE: &str = "fruit_save.json";

/// Main configuration struct for Orchard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Quality scoring configuration.
    pub scoring: ScoringConfig,
    /// Save file configuration.
    pub storage: StorageConfig,
    /// Volume levels handed to the audio collaborator.
    pub audio: AudioConfig,
    /// Action animation timing.
    pub animation: AnimationConfig,
    /// Plant catalog.
    pub plants: Vec<PlantConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            storage: StorageConfig::default(),
            audio: AudioConfig::default(),
            animation: AnimationConfig::default(),
            plants: default_plants(),
        }
    }
}

/// Quality scoring configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub policy: ScoringPolicy,
}

/// Save file configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Save document, relative to the Orchard home unless absolute.
    pub save_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_file: DEFAULT_SAVE_FILE.to_string(),
        }
    }
}

/// Volume levels, each in [0.0, 1.0].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub ui_volume: f32,
    /// Multiplier applied to `music_volume` for the menu track.
    pub menu_music_factor: f32,
}

impl AudioConfig {
    /// Check if a volume value is valid (must be in [0.0, 1.0] and finite).
    pub fn is_valid_volume(value: f32) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music_volume: 0.3,
            sfx_volume: 0.7,
            ui_volume: 0.5,
            menu_music_factor: 0.8,
        }
    }
}

/// Action animation timing, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// How long an action's effect object stays visible.
    pub action_seconds: f64,
    /// How long the controls stay locked after a submission.
    pub lockout_seconds: f64,
}

impl AnimationConfig {
    /// Check if a duration is valid (finite and non-negative).
    pub fn is_valid_seconds(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            action_seconds: 3.0,
            lockout_seconds: 3.0,
        }
    }
}

/// One plant in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantConfig {
    /// Identifier used as the ledger key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The hidden ordered combination of four actions.
    pub ideal_combo: IdealCombo,
    /// Asset names for the presentation layer. All optional.
    #[serde(default)]
    pub visuals: PlantVisuals,
}

impl PlantConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ideal_combo: IdealCombo) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ideal_combo,
            visuals: PlantVisuals::default(),
        }
    }

    pub fn with_visuals(mut self, visuals: PlantVisuals) -> Self {
        self.visuals = visuals;
        self
    }
}

/// Sprite names a plant hands to the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantVisuals {
    /// Sprite after each of the four growth stages.
    pub growth_sprites: Vec<String>,
    /// Final sprite for 1-4 mutations.
    pub mutation_sprites: Vec<String>,
    /// Final sprite for a perfect result.
    pub perfect_sprite: Option<String>,
    /// Locked collection slot.
    pub silhouette_sprite: Option<String>,
}

impl PlantVisuals {
    /// Sprite names following the `<id>_<variant>` convention.
    pub fn conventional(id: &str) -> Self {
        Self {
            growth_sprites: (1..=REQUIRED_ACTIONS)
                .map(|stage| format!("{}_stage_{}", id, stage))
                .collect(),
            mutation_sprites: (1..=REQUIRED_ACTIONS)
                .map(|count| format!("{}_mutation_{}", id, count))
                .collect(),
            perfect_sprite: Some(format!("{}_perfect", id)),
            silhouette_sprite: Some(format!("{}_silhouette", id)),
        }
    }

    /// Sprite after `stage` actions (1-4).
    pub fn growth_sprite(&self, stage: usize) -> Option<&str> {
        stage
            .checked_sub(1)
            .and_then(|i| self.growth_sprites.get(i))
            .map(String::as_str)
    }

    /// Final sprite for `mutation_tier` mutations (0 means perfect).
    pub fn result_sprite(&self, mutation_tier: u8) -> Option<&str> {
        if mutation_tier == 0 {
            return self.perfect_sprite.as_deref();
        }
        self.mutation_sprites
            .get(mutation_tier as usize - 1)
            .map(String::as_str)
    }
}

fn default_plants() -> Vec<PlantConfig> {
    use ActionType::*;

    vec![
        default_plant("dragonfruit", "Dragon Fruit", [Water, Sun, Prune, Wait]),
        default_plant("akebia", "Akebia", [Fertilizer, Water, SpecialLight, Wait]),
        default_plant(
            "pomegranate",
            "Pomegranate",
            [Sun, Water, Fertilizer, Prune],
        ),
    ]
}

fn default_plant(id: &str, name: &str, combo: [ActionType; 4]) -> PlantConfig {
    PlantConfig::new(id, name, IdealCombo::new(combo))
        .with_visuals(PlantVisuals::conventional(id))
}

impl Config {
    /// Load configuration from `<orchard_home>/config.toml`.
    ///
    /// A missing file means defaults. A file that exists but does not parse
    /// or validate is an error.
    pub fn load() -> Result<Self> {
        let path = orchard_home().map(|home| home.join("config.toml"));
        match path {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::from_defaults(),
        }
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        config.warn_missing_assets();
        config.warn_repeated_actions();
        Ok(config)
    }

    fn from_defaults() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without env overrides or validation.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| OrchardError::storage(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| OrchardError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // ORCHARD_SCORING_POLICY
        if let Ok(val) = env::var("ORCHARD_SCORING_POLICY") {
            match val.parse::<ScoringPolicy>() {
                Ok(policy) => self.scoring.policy = policy,
                Err(_) => tracing::warn!(
                    "Invalid ORCHARD_SCORING_POLICY value '{}'. Valid values: correct_only, \
                    partial_credit. Using '{}'.",
                    val,
                    self.scoring.policy
                ),
            }
        }

        // ORCHARD_SAVE_FILE
        if let Ok(val) = env::var("ORCHARD_SAVE_FILE") {
            if val.trim().is_empty() {
                tracing::warn!(
                    "ORCHARD_SAVE_FILE is empty, using '{}'",
                    self.storage.save_file
                );
            } else {
                self.storage.save_file = val;
            }
        }
    }

    /// Reject configurations that would make scoring meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.plants.is_empty() {
            return Err(OrchardError::config("plant catalog is empty"));
        }

        let mut seen = HashSet::new();
        for plant in &self.plants {
            if plant.id.trim().is_empty() {
                return Err(OrchardError::config(format!(
                    "plant '{}' has an empty id",
                    plant.name
                )));
            }
            if !seen.insert(plant.id.as_str()) {
                return Err(OrchardError::config(format!(
                    "duplicate plant id '{}'",
                    plant.id
                )));
            }
        }

        for (name, value) in [
            ("music_volume", self.audio.music_volume),
            ("sfx_volume", self.audio.sfx_volume),
            ("ui_volume", self.audio.ui_volume),
            ("menu_music_factor", self.audio.menu_music_factor),
        ] {
            if !AudioConfig::is_valid_volume(value) {
                return Err(OrchardError::config(format!(
                    "audio.{} must be in [0.0, 1.0], got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("action_seconds", self.animation.action_seconds),
            ("lockout_seconds", self.animation.lockout_seconds),
        ] {
            if !AnimationConfig::is_valid_seconds(value) {
                return Err(OrchardError::config(format!(
                    "animation.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.storage.save_file.trim().is_empty() {
            return Err(OrchardError::config("storage.save_file is empty"));
        }

        Ok(())
    }

    /// Log a warning for every sprite the presentation layer will miss.
    ///
    /// Missing assets degrade what is shown; they never stop a session.
    pub fn warn_missing_assets(&self) -> usize {
        let mut missing = 0;
        for plant in &self.plants {
            let visuals = &plant.visuals;
            if visuals.growth_sprites.len() < REQUIRED_ACTIONS {
                tracing::warn!(
                    plant = %plant.id,
                    "{} of {} growth sprites configured",
                    visuals.growth_sprites.len(),
                    REQUIRED_ACTIONS
                );
                missing += REQUIRED_ACTIONS - visuals.growth_sprites.len().min(REQUIRED_ACTIONS);
            }
            if visuals.mutation_sprites.len() < REQUIRED_ACTIONS {
                tracing::warn!(
                    plant = %plant.id,
                    "{} of {} mutation sprites configured",
                    visuals.mutation_sprites.len(),
                    REQUIRED_ACTIONS
                );
                missing += REQUIRED_ACTIONS - visuals.mutation_sprites.len().min(REQUIRED_ACTIONS);
            }
            if visuals.perfect_sprite.is_none() {
                tracing::warn!(plant = %plant.id, "perfect sprite not configured");
                missing += 1;
            }
            if visuals.silhouette_sprite.is_none() {
                tracing::warn!(plant = %plant.id, "silhouette sprite not configured");
                missing += 1;
            }
        }
        missing
    }

    /// Log a warning for every combo that repeats an action.
    ///
    /// Each control is consumed after one use, so such a combo can never be
    /// grown perfect through the controls.
    pub fn warn_repeated_actions(&self) -> usize {
        let mut repeated = 0;
        for plant in &self.plants {
            let unique: HashSet<ActionType> = plant.ideal_combo.actions().iter().copied().collect();
            if unique.len() < REQUIRED_ACTIONS {
                tracing::warn!(
                    plant = %plant.id,
                    combo = ?plant.ideal_combo.actions(),
                    "ideal combo repeats an action; a perfect result is unreachable"
                );
                repeated += 1;
            }
        }
        repeated
    }

    /// Look up a plant by id.
    pub fn plant(&self, id: &str) -> Result<&PlantConfig> {
        self.plants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| OrchardError::unknown_plant(id))
    }
}

/// Get the Orchard data directory.
///
/// Checks `ORCHARD_HOME` first, then the platform data directory
/// (`dirs::data_dir()/orchard`), then a per-user temp directory.
pub fn orchard_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("ORCHARD_HOME") {
        if home.is_empty() {
            tracing::warn!("ORCHARD_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("ORCHARD_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(data) = dirs::data_dir() {
        return Some(data.join("orchard"));
    }

    let fallback_path = fallback_orchard_home();
    tracing::warn!(
        "No data directory available, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback home path when no data directory is available.
#[cfg(unix)]
fn fallback_orchard_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/orchard-{}", uid))
}

/// Get fallback home path when no data directory is available.
#[cfg(not(unix))]
fn fallback_orchard_home() -> PathBuf {
    std::env::temp_dir().join("orchard")
}

/// Resolve the save document path for `config`.
pub fn save_path(config: &Config) -> Option<PathBuf> {
    let file = Path::new(&config.storage.save_file);
    if file.is_absolute() {
        return Some(file.to_path_buf());
    }
    orchard_home().map(|home| home.join(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.scoring.policy, ScoringPolicy::CorrectOnly);
        assert_eq!(config.storage.save_file, "fruit_save.json");
        assert!((config.audio.music_volume - 0.3).abs() < f32::EPSILON);
        assert!((config.animation.lockout_seconds - 3.0).abs() < f64::EPSILON);

        let ids: Vec<&str> = config.plants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["dragonfruit", "akebia", "pomegranate"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.warn_missing_assets(), 0);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
[scoring]
policy = "partial_credit"

[[plants]]
id = "kiwi"
name = "Kiwi"
ideal_combo = ["water", "water", "sun", "wait"]
"#,
        )
        .unwrap();

        assert_eq!(config.scoring.policy, ScoringPolicy::PartialCredit);
        assert_eq!(config.plants.len(), 1);
        let kiwi = config.plant("kiwi").unwrap();
        assert_eq!(kiwi.ideal_combo.expected(1), Some(ActionType::Water));
        assert!(kiwi.visuals.growth_sprites.is_empty());
        // Untouched sections keep defaults
        assert_eq!(config.storage.save_file, DEFAULT_SAVE_FILE);
    }

    #[test]
    fn test_wrong_combo_length_fails_fast() {
        let err = Config::from_toml(
            r#"
[[plants]]
id = "kiwi"
name = "Kiwi"
ideal_combo = ["water", "sun", "wait"]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, OrchardError::Config { .. }));
        assert!(err.to_string().contains("exactly 4 actions"));
    }

    #[test]
    fn test_unknown_action_fails() {
        let result = Config::from_toml(
            r#"
[[plants]]
id = "kiwi"
name = "Kiwi"
ideal_combo = ["water", "sun", "dance", "wait"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_plant_ids_rejected() {
        let mut config = Config::default();
        let copy = config.plants[0].clone();
        config.plants.push(copy);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate plant id 'dragonfruit'"));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = Config {
            plants: Vec::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_volume_rejected() {
        let mut config = Config::default();
        config.audio.sfx_volume = 1.5;
        assert!(config.validate().is_err());

        config.audio.sfx_volume = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_lockout_rejected() {
        let mut config = Config::default();
        config.animation.lockout_seconds = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_assets_are_counted_not_fatal() {
        let mut config = Config::default();
        config.plants[0].visuals = PlantVisuals::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.warn_missing_assets(), 10);
    }

    #[test]
    fn test_repeated_actions_are_warned_not_fatal() {
        let mut config = Config::default();
        assert_eq!(config.warn_repeated_actions(), 0);

        config.plants[2].ideal_combo = IdealCombo::new([
            ActionType::Sun,
            ActionType::Water,
            ActionType::Water,
            ActionType::Prune,
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.warn_repeated_actions(), 1);
    }

    #[test]
    fn test_unknown_plant_lookup() {
        let config = Config::default();
        let err = config.plant("kiwi").unwrap_err();
        assert!(matches!(err, OrchardError::UnknownPlant { .. }));
    }

    #[test]
    fn test_visual_lookups() {
        let visuals = PlantVisuals::conventional("akebia");
        assert_eq!(visuals.growth_sprite(1), Some("akebia_stage_1"));
        assert_eq!(visuals.growth_sprite(4), Some("akebia_stage_4"));
        assert_eq!(visuals.growth_sprite(0), None);
        assert_eq!(visuals.growth_sprite(5), None);
        assert_eq!(visuals.result_sprite(0), Some("akebia_perfect"));
        assert_eq!(visuals.result_sprite(2), Some("akebia_mutation_2"));
        assert_eq!(PlantVisuals::default().result_sprite(3), None);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml(&content).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_load_from_file_with_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scoring]\npolicy = \"correct_only\"\n").unwrap();

        env::set_var("ORCHARD_SCORING_POLICY", "partial_credit");
        env::set_var("ORCHARD_SAVE_FILE", "slot2.json");
        let config = Config::load_from(&path).unwrap();
        env::remove_var("ORCHARD_SCORING_POLICY");
        env::remove_var("ORCHARD_SAVE_FILE");

        assert_eq!(config.scoring.policy, ScoringPolicy::PartialCredit);
        assert_eq!(config.storage.save_file, "slot2.json");
    }

    #[test]
    #[serial]
    fn test_invalid_env_policy_ignored() {
        env::set_var("ORCHARD_SCORING_POLICY", "generous");
        let mut config = Config::default();
        config.apply_env_overrides();
        env::remove_var("ORCHARD_SCORING_POLICY");

        assert_eq!(config.scoring.policy, ScoringPolicy::CorrectOnly);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        assert!(Config::load_from(Path::new("/nonexistent/orchard.toml")).is_err());
    }

    #[test]
    #[serial]
    fn test_orchard_home_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("ORCHARD_HOME", dir.path());
        let home = orchard_home();
        let config = Config::load();
        env::remove_var("ORCHARD_HOME");

        assert_eq!(home, Some(dir.path().to_path_buf()));
        // No config.toml in the home: defaults
        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    #[serial]
    fn test_save_path_resolution() {
        let dir = TempDir::new().unwrap();
        env::set_var("ORCHARD_HOME", dir.path());
        let relative = save_path(&Config::default());
        env::remove_var("ORCHARD_HOME");

        assert_eq!(relative, Some(dir.path().join("fruit_save.json")));

        let mut config = Config::default();
        config.storage.save_file = dir.path().join("abs.json").display().to_string();
        assert_eq!(save_path(&config), Some(dir.path().join("abs.json")));
    }
}
