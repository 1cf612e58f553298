use clap::Args;
use fastrand::Rng;
use image::Rgb;
use strum_macros::{Display, EnumIter, EnumString};

use crate::optimizer::mutation;
use crate::raster::Raster;

/// Synthetic corruption models for building test inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum NoiseModel {
    SaltPepper,
    Chroma,
    Periodic,
    Gaussian,
}

#[derive(Args, Debug, Clone)]
pub struct NoiseOptions {
    /// Fraction of the raster's area drawn for salt-pepper and chroma hits.
    #[arg(long, default_value_t = 0.10)]
    pub density: f32,

    /// Peak pixel offset of the periodic wave.
    #[arg(long, default_value_t = 20.0)]
    pub amplitude: f32,

    /// Angular frequency of the periodic wave, per row.
    #[arg(long, default_value_t = 10.0)]
    pub frequency: f32,

    /// Standard deviation of the gaussian channel offsets.
    #[arg(long, default_value_t = 50.0)]
    pub std_dev: f32,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            density: 0.10,
            amplitude: 20.0,
            frequency: 10.0,
            std_dev: 50.0,
        }
    }
}

pub fn apply(model: NoiseModel, raster: &mut Raster, options: &NoiseOptions, rng: &mut Rng) {
    match model {
        NoiseModel::SaltPepper => salt_pepper(raster, options.density, rng),
        NoiseModel::Chroma => chroma(raster, options.density, rng),
        NoiseModel::Periodic => periodic(raster, options.amplitude, options.frequency),
        NoiseModel::Gaussian => gaussian(raster, options.std_dev, rng),
    }
}

/// Paints random pixels pure black or pure white, one fair coin per draw.
/// Positions are drawn with replacement, so the touched fraction can come
/// in under `density`.
pub fn salt_pepper(raster: &mut Raster, density: f32, rng: &mut Rng) {
    let (height, width, _) = raster.shape();
    let draws = (height as f32 * width as f32 * density) as usize;
    for _ in 0..draws {
        let y = rng.u32(0..height);
        let x = rng.u32(0..width);
        let v = if rng.bool() { 255 } else { 0 };
        raster.set_pixel(y, x, Rgb([v, v, v]));
    }
}

/// Like salt-pepper, but each hit becomes a random color with pairwise
/// distinct channels, the same sampling rule the evolutionary mutants use.
pub fn chroma(raster: &mut Raster, density: f32, rng: &mut Rng) {
    let (height, width, _) = raster.shape();
    let draws = (height as f32 * width as f32 * density) as usize;
    for _ in 0..draws {
        let y = rng.u32(0..height);
        let x = rng.u32(0..width);
        raster.set_pixel(y, x, mutation::random_color(rng));
    }
}

/// Shifts every pixel of row y by `amplitude * sin(frequency * y)`, the
/// same amount across the row and all three channels, saturating at both
/// ends of the 8-bit range.
pub fn periodic(raster: &mut Raster, amplitude: f32, frequency: f32) {
    let (height, width, _) = raster.shape();
    for y in 0..height {
        let offset = (amplitude * (frequency * y as f32).sin()) as i16;
        if offset == 0 {
            continue;
        }
        for x in 0..width {
            let pixel = raster.pixel(y, x);
            let shifted = Rgb(pixel.0.map(|v| (v as i16 + offset).clamp(0, 255) as u8));
            raster.set_pixel(y, x, shifted);
        }
    }
}

/// Independent N(0, std_dev^2) offset on every channel of every pixel,
/// clamped into range.
pub fn gaussian(raster: &mut Raster, std_dev: f32, rng: &mut Rng) {
    let (height, width, _) = raster.shape();
    for y in 0..height {
        for x in 0..width {
            let pixel = raster.pixel(y, x);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let v = pixel.0[c] as f32 + sample_standard_normal(rng) * std_dev;
                out[c] = v.clamp(0.0, 255.0) as u8;
            }
            raster.set_pixel(y, x, Rgb(out));
        }
    }
}

/// Standard normal draw via the Box-Muller transform.
fn sample_standard_normal(rng: &mut Rng) -> f32 {
    let u1 = rng.f32().max(1e-10);
    let u2 = rng.f32();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}
