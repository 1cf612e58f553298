use image::Rgb;

/// Mean and population standard deviation of a single channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f32,
    pub std_dev: f32,
}

impl ChannelStats {
    /// Standard score of `value` against this channel, or None when the
    /// channel has no spread. Degenerate windows never produce a non-finite
    /// score; callers treat None as "no evidence of noise".
    pub fn z_score(&self, value: u8) -> Option<f32> {
        if self.std_dev == 0.0 {
            None
        } else {
            Some((value as f32 - self.mean) / self.std_dev)
        }
    }
}

/// Per-channel summary of a neighborhood. Computed once per target pixel and
/// held fixed for the whole search, so every generation is judged against
/// the same reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborhoodStats {
    pub channels: [ChannelStats; 3],
}

impl NeighborhoodStats {
    /// Population statistics (divide by n) over the sampled pixels.
    /// Returns None for an empty sample.
    pub fn from_pixels(pixels: &[Rgb<u8>]) -> Option<Self> {
        if pixels.is_empty() {
            return None;
        }
        let n = pixels.len() as f32;

        let mut sums = [0.0f32; 3];
        for pixel in pixels {
            for (sum, &v) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += v as f32;
            }
        }
        let means = sums.map(|s| s / n);

        let mut sq_dev = [0.0f32; 3];
        for pixel in pixels {
            for c in 0..3 {
                let d = pixel.0[c] as f32 - means[c];
                sq_dev[c] += d * d;
            }
        }

        let channels = [0, 1, 2].map(|c| ChannelStats {
            mean: means[c],
            std_dev: (sq_dev[c] / n).sqrt(),
        });
        Some(Self { channels })
    }
}
