pub mod stats;

pub use self::stats::{ChannelStats, NeighborhoodStats};

use image::Rgb;
use rayon::prelude::*;

use crate::config::DetectionParams;
use crate::raster::{Raster, Window};

/// Flags pixels whose channels stray too far from their neighborhood and
/// scores replacement candidates against the same statistics.
pub struct DeviationScorer {
    pub z_threshold: f32,
}

impl DeviationScorer {
    pub fn new(params: &DetectionParams) -> Self {
        Self {
            z_threshold: params.z_threshold,
        }
    }

    /// True when any channel deviates from its neighborhood by more than
    /// the threshold. Flat channels carry no evidence and never trigger.
    pub fn is_noisy(&self, color: Rgb<u8>, stats: &NeighborhoodStats) -> bool {
        color
            .0
            .iter()
            .zip(stats.channels.iter())
            .any(|(&v, ch)| ch.z_score(v).is_some_and(|z| z.abs() > self.z_threshold))
    }

    /// Sum of the signed per-channel standard scores. Channels deviating in
    /// opposite directions cancel; flat channels contribute zero.
    pub fn signed_deviation(&self, color: Rgb<u8>, stats: &NeighborhoodStats) -> f32 {
        color
            .0
            .iter()
            .zip(stats.channels.iter())
            .filter_map(|(&v, ch)| ch.z_score(v))
            .sum()
    }

    /// Candidate fitness: magnitude of the signed deviation sum. Lower is
    /// better, zero means the color sits on the neighborhood means.
    pub fn fitness(&self, color: Rgb<u8>, stats: &NeighborhoodStats) -> f32 {
        self.signed_deviation(color, stats).abs()
    }
}

/// Read-only census of a raster: what the classifier would flag, without
/// touching a single pixel.
#[derive(Debug, Default, Clone)]
pub struct NoiseAudit {
    pub pixels: usize,
    pub flagged: usize,
    pub flat_windows: usize,
    pub channel_triggers: [usize; 3],
    pub flagged_per_row: Vec<usize>,
}

impl NoiseAudit {
    pub fn flagged_ratio(&self) -> f32 {
        if self.pixels == 0 {
            0.0
        } else {
            self.flagged as f32 / self.pixels as f32
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RowAudit {
    pixels: usize,
    flagged: usize,
    flat_windows: usize,
    channel_triggers: [usize; 3],
}

/// Classifies every pixel of `raster` in parallel, one row per rayon task.
/// Legal because the audit only reads.
pub fn audit_raster(raster: &Raster, params: &DetectionParams) -> NoiseAudit {
    let scorer = DeviationScorer::new(params);
    let window = Window::square(params.window_side);

    let rows: Vec<RowAudit> = (0..raster.height())
        .into_par_iter()
        .map(|y| audit_row(raster, &scorer, window, y))
        .collect();

    let mut audit = NoiseAudit {
        flagged_per_row: Vec::with_capacity(rows.len()),
        ..Default::default()
    };
    for row in rows {
        audit.pixels += row.pixels;
        audit.flagged += row.flagged;
        audit.flat_windows += row.flat_windows;
        for c in 0..3 {
            audit.channel_triggers[c] += row.channel_triggers[c];
        }
        audit.flagged_per_row.push(row.flagged);
    }
    audit
}

fn audit_row(raster: &Raster, scorer: &DeviationScorer, window: Window, y: u32) -> RowAudit {
    let mut row = RowAudit::default();
    for x in 0..raster.width() {
        row.pixels += 1;
        let pixels = raster.neighborhood(y, x, window);
        let Some(stats) = NeighborhoodStats::from_pixels(&pixels) else {
            continue;
        };
        if stats.channels.iter().all(|ch| ch.std_dev == 0.0) {
            row.flat_windows += 1;
            continue;
        }
        let color = raster.pixel(y, x);
        let mut any = false;
        for c in 0..3 {
            if stats.channels[c]
                .z_score(color.0[c])
                .is_some_and(|z| z.abs() > scorer.z_threshold)
            {
                row.channel_triggers[c] += 1;
                any = true;
            }
        }
        if any {
            row.flagged += 1;
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn stats_of(pixels: &[Rgb<u8>]) -> NeighborhoodStats {
        NeighborhoodStats::from_pixels(pixels).unwrap()
    }

    #[test]
    fn test_outlier_against_flat_window_is_quiet() {
        // All-black neighborhood has zero spread everywhere, so even a pure
        // red center produces no z evidence.
        let scorer = DeviationScorer { z_threshold: 2.0 };
        let stats = stats_of(&vec![Rgb([0, 0, 0]); 25]);
        assert!(!scorer.is_noisy(Rgb([255, 0, 0]), &stats));
        assert_eq!(scorer.fitness(Rgb([255, 0, 0]), &stats), 0.0);
    }

    #[test]
    fn test_opposite_deviations_cancel_in_fitness() {
        let scorer = DeviationScorer { z_threshold: 2.0 };
        // Two channels spread 10 around mean 20, third flat.
        let stats = stats_of(&[Rgb([10, 10, 7]), Rgb([30, 30, 7])]);
        // +3 sigma on R, -2 sigma on G: still noisy, but fitness is 1 sigma.
        let color = Rgb([50, 0, 7]);
        assert!(scorer.is_noisy(color, &stats));
        assert!((scorer.fitness(color, &stats) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_audit_flags_a_planted_outlier() {
        let mut image = RgbImage::from_fn(9, 9, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([100, 100, 100])
            } else {
                Rgb([110, 110, 110])
            }
        });
        image.put_pixel(4, 4, Rgb([255, 255, 255]));
        let raster = Raster::new(image);

        let audit = audit_raster(&raster, &DetectionParams::default());
        assert_eq!(audit.pixels, 81);
        assert_eq!(audit.flagged_per_row.len(), 9);
        assert!(audit.flagged >= 1);
        assert!(audit.flagged_per_row[4] >= 1);
    }

    #[test]
    fn test_audit_of_uniform_raster_is_all_flat() {
        let raster = Raster::new(RgbImage::from_pixel(6, 4, Rgb([42, 42, 42])));
        let audit = audit_raster(&raster, &DetectionParams::default());
        assert_eq!(audit.flagged, 0);
        assert_eq!(audit.flat_windows, 24);
        assert_eq!(audit.flagged_ratio(), 0.0);
    }
}
