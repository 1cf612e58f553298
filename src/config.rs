use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{PfResult, PixelForgeError};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub detection: DetectionParams,
    #[command(flatten)]
    pub ga: GaParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Absolute z-score above which a channel marks its pixel as noise.
    #[arg(long, default_value_t = 2.0)]
    pub z_threshold: f32,

    /// Side length of the square sampling window. Must be odd.
    #[arg(long, default_value_t = 5)]
    pub window_side: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            window_side: 5,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    #[arg(long, default_value_t = 25)]
    pub population_size: usize,

    // === GENERATION SPLIT ===
    #[arg(long, default_value_t = 0.20)]
    pub elite_fraction: f32,
    #[arg(long, default_value_t = 0.75)]
    pub crossover_fraction: f32,
    #[arg(long, default_value_t = 0.50)]
    pub parent_pool_fraction: f32,

    // === TERMINATION ===
    #[arg(long, default_value_t = 0.5)]
    pub convergence_threshold: f32,
    #[arg(long, default_value_t = 200)]
    pub max_generations: usize,
    #[arg(long, default_value_t = ExhaustionPolicy::KeepOriginal)]
    pub on_exhaustion: ExhaustionPolicy,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 25,
            elite_fraction: 0.20,
            crossover_fraction: 0.75,
            parent_pool_fraction: 0.50,
            convergence_threshold: 0.5,
            max_generations: 200,
            on_exhaustion: ExhaustionPolicy::KeepOriginal,
        }
    }
}

/// What the scan does with a pixel whose search hit the generation cap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Leave the original pixel untouched.
    KeepOriginal,
    /// Commit the best candidate found so far.
    AcceptBest,
}

impl GaParams {
    /// Fittest members copied unchanged into the next generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f32 * self.elite_fraction) as usize
    }

    /// Children produced by crossover each generation.
    pub fn child_count(&self) -> usize {
        (self.population_size as f32 * self.crossover_fraction) as usize
    }

    /// Fittest members eligible as crossover parents.
    pub fn parent_pool(&self) -> usize {
        (self.population_size as f32 * self.parent_pool_fraction) as usize
    }

    /// Fresh mutants filling the remainder of the generation.
    ///
    /// Sized as population minus elites minus children so every generation
    /// holds exactly `population_size` members. The floor-based split
    /// (25 -> 5 + 18) would otherwise leave the population one short.
    pub fn mutant_count(&self) -> usize {
        self.population_size
            .saturating_sub(self.elite_count())
            .saturating_sub(self.child_count())
    }
}

impl DetectionParams {
    pub fn merge_from_cli(&mut self, cli: &DetectionParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(z_threshold, "z_threshold");
        update_if_present!(window_side, "window_side");
    }
}

impl GaParams {
    pub fn merge_from_cli(&mut self, cli: &GaParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(population_size, "population_size");
        update_if_present!(elite_fraction, "elite_fraction");
        update_if_present!(crossover_fraction, "crossover_fraction");
        update_if_present!(parent_pool_fraction, "parent_pool_fraction");
        update_if_present!(convergence_threshold, "convergence_threshold");
        update_if_present!(max_generations, "max_generations");
        update_if_present!(on_exhaustion, "on_exhaustion");
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("❌ Failed to read params file: {}", e));

        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("❌ Failed to parse params JSON: {}", e))
    }

    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        self.detection.merge_from_cli(&cli.detection, matches);
        self.ga.merge_from_cli(&cli.ga, matches);
    }

    pub fn validate(&self) -> PfResult<()> {
        if self.detection.window_side == 0 || self.detection.window_side % 2 == 0 {
            return Err(PixelForgeError::Config(format!(
                "window_side must be odd, got {}",
                self.detection.window_side
            )));
        }
        if self.detection.z_threshold <= 0.0 {
            return Err(PixelForgeError::Config(format!(
                "z_threshold must be positive, got {}",
                self.detection.z_threshold
            )));
        }
        if self.ga.population_size == 0 {
            return Err(PixelForgeError::Config(
                "population_size must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("elite_fraction", self.ga.elite_fraction),
            ("crossover_fraction", self.ga.crossover_fraction),
            ("parent_pool_fraction", self.ga.parent_pool_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PixelForgeError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.ga.elite_count() + self.ga.child_count() > self.ga.population_size {
            return Err(PixelForgeError::Config(format!(
                "elite ({}) + crossover ({}) members exceed the population of {}",
                self.ga.elite_count(),
                self.ga.child_count(),
                self.ga.population_size
            )));
        }
        if self.ga.convergence_threshold < 0.0 {
            return Err(PixelForgeError::Config(format!(
                "convergence_threshold must be non-negative, got {}",
                self.ga.convergence_threshold
            )));
        }
        if self.ga.max_generations == 0 {
            return Err(PixelForgeError::Config(
                "max_generations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
