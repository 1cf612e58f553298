use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};
use tracing::{debug, info, warn};

use crate::config::{Config, ExhaustionPolicy};
use crate::error::{PfResult, PixelForgeError};
use crate::optimizer::{mutation, Candidate, Population};
use crate::raster::{Raster, Window};
use crate::scorer::{DeviationScorer, NeighborhoodStats};

pub struct ScanOptions {
    pub seed: Option<u64>,
    /// Record a full-raster snapshot after every committed pixel.
    pub record_snapshots: bool,
    pub max_time: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            seed: None,
            record_snapshots: false,
            max_time: None,
        }
    }
}

/// Outcome of one pixel's evolutionary search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelSearch {
    /// The fittest candidate reached the acceptance band.
    Converged { best: Candidate, generations: usize },
    /// The generation cap ran out first; `best` is the best seen.
    Exhausted { best: Candidate, generations: usize },
}

impl PixelSearch {
    pub fn best(&self) -> Candidate {
        match self {
            PixelSearch::Converged { best, .. } | PixelSearch::Exhausted { best, .. } => *best,
        }
    }

    pub fn generations(&self) -> usize {
        match self {
            PixelSearch::Converged { generations, .. }
            | PixelSearch::Exhausted { generations, .. } => *generations,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, PixelSearch::Converged { .. })
    }
}

/// Tallies of one full scan.
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub pixels_scanned: usize,
    pub flagged: usize,
    pub converged: usize,
    pub exhausted: usize,
    pub skipped: usize,
    pub commits: usize,
    pub generations: usize,
    pub deadline_hit: bool,
    pub elapsed: Duration,
    pub flagged_per_row: Vec<usize>,
    pub commits_per_row: Vec<usize>,
}

impl ScanReport {
    pub fn mean_generations(&self) -> f32 {
        if self.flagged == 0 {
            0.0
        } else {
            self.generations as f32 / self.flagged as f32
        }
    }
}

/// Everything a finished scan hands back: the commit-by-commit snapshot
/// trail, the per-row cumulative snapshot counts, and the tallies.
pub struct DenoiseOutcome {
    pub snapshots: Vec<RgbImage>,
    /// One entry per raster row: how many snapshots existed when the row
    /// finished. Non-decreasing; the last entry equals the snapshot total.
    pub row_marks: Vec<usize>,
    pub report: ScanReport,
}

/// A trait for receiving updates as the scan finishes each row.
/// Boolean return value indicates if the scan should continue (true) or abort (false).
pub trait ProgressCallback {
    fn on_row(&self, row: u32, flagged: usize, commits: usize) -> bool;
}

/// Callback that never reports and never aborts.
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_row(&self, _row: u32, _flagged: usize, _commits: usize) -> bool {
        true
    }
}

pub struct Denoiser {
    scorer: DeviationScorer,
    config: Config,
}

impl Denoiser {
    pub fn new(config: Config) -> PfResult<Self> {
        config.validate()?;
        let scorer = DeviationScorer::new(&config.detection);
        Ok(Self { scorer, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evolves a replacement color against fixed neighborhood statistics.
    /// The reference never changes between generations, so fitness always
    /// measures distance from the original surroundings.
    pub fn evolve_pixel(
        &self,
        neighborhood: &[Rgb<u8>],
        stats: &NeighborhoodStats,
        rng: &mut fastrand::Rng,
    ) -> PixelSearch {
        let ga = &self.config.ga;
        let mut population = Population::seed(neighborhood, ga.population_size, rng);
        let mut generations = 0;

        loop {
            // 1. Score and rank the current generation
            population.score_against(&self.scorer, stats);
            population.sort_by_fitness();
            generations += 1;

            let best = *population.fittest();

            // 2. Accept once the leader lands inside the band
            if best.fitness <= ga.convergence_threshold {
                return PixelSearch::Converged { best, generations };
            }

            // 3. Bounded search: give up after the cap
            if generations >= ga.max_generations {
                return PixelSearch::Exhausted { best, generations };
            }

            // 4. Breed the next generation and go again
            let next = mutation::next_generation(population.members(), ga, rng);
            population.replace(next);
        }
    }

    /// Runs the search for a single pixel without writing anything back.
    pub fn search_at(
        &self,
        raster: &Raster,
        y: u32,
        x: u32,
        rng: &mut fastrand::Rng,
    ) -> PfResult<PixelSearch> {
        let (height, width, _) = raster.shape();
        if y >= height || x >= width {
            return Err(PixelForgeError::Validation(format!(
                "pixel ({}, {}) lies outside the {}x{} raster",
                y, x, height, width
            )));
        }
        let window = Window::square(self.config.detection.window_side);
        let pixels = raster.neighborhood(y, x, window);
        let stats = NeighborhoodStats::from_pixels(&pixels)
            .ok_or(PixelForgeError::EmptyWindow { y, x })?;
        Ok(self.evolve_pixel(&pixels, &stats, rng))
    }

    /// Row-major scan over the whole raster. Flagged pixels are replaced in
    /// place, so every commit is visible to the neighborhoods that follow.
    pub fn run<CB: ProgressCallback>(
        &self,
        raster: &mut Raster,
        options: &ScanOptions,
        callback: CB,
    ) -> PfResult<DenoiseOutcome> {
        let (height, width, _) = raster.shape();
        if height == 0 || width == 0 {
            return Err(PixelForgeError::Config(format!(
                "cannot scan an empty {}x{} raster",
                height, width
            )));
        }

        let window = Window::square(self.config.detection.window_side);
        let mut rng = if let Some(s) = options.seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };

        let mut report = ScanReport::default();
        let mut snapshots: Vec<RgbImage> = Vec::new();
        let mut row_marks = Vec::with_capacity(height as usize);
        let start_time = Instant::now();

        info!(height, width, "denoise scan started");

        'scan: for y in 0..height {
            let mut row_flagged = 0;
            let mut row_commits = 0;

            for x in 0..width {
                if let Some(limit) = options.max_time {
                    if start_time.elapsed() >= limit {
                        report.deadline_hit = true;
                        warn!(row = y, "time budget spent, stopping scan early");
                        break 'scan;
                    }
                }

                report.pixels_scanned += 1;

                // A. Sample the reference window around the pixel
                let pixels = raster.neighborhood(y, x, window);
                let Some(stats) = NeighborhoodStats::from_pixels(&pixels) else {
                    report.skipped += 1;
                    warn!(y, x, "empty neighborhood, pixel skipped");
                    continue;
                };

                // B. Classify; quiet pixels pass untouched
                let color = raster.pixel(y, x);
                if !self.scorer.is_noisy(color, &stats) {
                    continue;
                }
                report.flagged += 1;
                row_flagged += 1;

                // C. Evolve a replacement
                let search = self.evolve_pixel(&pixels, &stats, &mut rng);
                report.generations += search.generations();

                let commit = match search {
                    PixelSearch::Converged { .. } => {
                        report.converged += 1;
                        true
                    }
                    PixelSearch::Exhausted { .. } => {
                        report.exhausted += 1;
                        debug!(y, x, "search exhausted the generation cap");
                        self.config.ga.on_exhaustion == ExhaustionPolicy::AcceptBest
                    }
                };

                // D. Commit in place
                if commit {
                    raster.set_pixel(y, x, search.best().color);
                    report.commits += 1;
                    row_commits += 1;
                    if options.record_snapshots {
                        snapshots.push(raster.snapshot());
                    }
                }
            }

            report.flagged_per_row.push(row_flagged);
            report.commits_per_row.push(row_commits);
            row_marks.push(snapshots.len());

            if !callback.on_row(y, row_flagged, row_commits) {
                warn!(row = y, "scan aborted by caller");
                break;
            }
        }

        // Rows the scan never reached contribute no snapshots, so their
        // marks repeat the final count.
        while row_marks.len() < height as usize {
            row_marks.push(snapshots.len());
        }

        report.elapsed = start_time.elapsed();
        info!(
            flagged = report.flagged,
            commits = report.commits,
            exhausted = report.exhausted,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "denoise scan finished"
        );

        Ok(DenoiseOutcome {
            snapshots,
            row_marks,
            report,
        })
    }
}
