use image::{Rgb, RgbImage};
use std::path::Path;

use crate::error::PfResult;

/// Square sampling window. Anchored `side / 2` cells above and left of its
/// target, so an odd side covers symmetric offsets (side 5 -> -2..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    side: u32,
}

impl Window {
    pub fn square(side: u32) -> Self {
        Self { side }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Offsets relative to the target, top-left first.
    pub fn offsets(&self) -> impl Iterator<Item = (i64, i64)> {
        let side = self.side as i64;
        let start = -(side / 2);
        (start..start + side)
            .flat_map(move |dy| (start..start + side).map(move |dx| (dy, dx)))
    }
}

/// Mutable RGB8 grid. Coordinates are (row, column) with the origin at the
/// top-left, translated to the image crate's (x, y) internally.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> PfResult<Self> {
        let image = image::open(path)?.to_rgb8();
        Ok(Self { image })
    }

    /// Encodes by file extension (PNG, BMP, ...).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PfResult<()> {
        self.image.save(path)?;
        Ok(())
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.image.height(), self.image.width(), 3)
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn pixel(&self, y: u32, x: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn set_pixel(&mut self, y: u32, x: u32, color: Rgb<u8>) {
        self.image.put_pixel(x, y, color);
    }

    /// Collects the in-bounds pixels of `window` centered on (y, x), target
    /// included. Cells past the border are skipped, never wrapped or
    /// mirrored, so edge and corner windows come back short.
    pub fn neighborhood(&self, y: u32, x: u32, window: Window) -> Vec<Rgb<u8>> {
        let (h, w) = (self.height() as i64, self.width() as i64);
        let mut pixels = Vec::with_capacity((window.side() * window.side()) as usize);
        for (dy, dx) in window.offsets() {
            let (ny, nx) = (y as i64 + dy, x as i64 + dx);
            if ny >= 0 && ny < h && nx >= 0 && nx < w {
                pixels.push(self.pixel(ny as u32, nx as u32));
            }
        }
        pixels
    }

    pub fn snapshot(&self) -> RgbImage {
        self.image.clone()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Sequential 3x3 box filter, written in place. Earlier rows feed into
    /// later means, the same visibility rule the evolutionary scan uses.
    pub fn apply_mean_filter(&mut self) {
        let window = Window::square(3);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pixels = self.neighborhood(y, x, window);
                let count = pixels.len() as u32;
                if count == 0 {
                    continue;
                }
                let mut sums = [0u32; 3];
                for pixel in &pixels {
                    for (sum, &v) in sums.iter_mut().zip(pixel.0.iter()) {
                        *sum += v as u32;
                    }
                }
                let mean = Rgb(sums.map(|s| (s / count) as u8));
                self.set_pixel(y, x, mean);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(h: u32, w: u32) -> Raster {
        Raster::new(RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_interior_window_is_full() {
        let raster = checkerboard(10, 10);
        assert_eq!(raster.neighborhood(5, 5, Window::square(5)).len(), 25);
        assert_eq!(raster.neighborhood(5, 5, Window::square(3)).len(), 9);
    }

    #[test]
    fn test_corner_window_is_clipped() {
        let raster = checkerboard(10, 10);
        // Only offsets 0..=2 survive in each axis.
        assert_eq!(raster.neighborhood(0, 0, Window::square(5)).len(), 9);
        assert_eq!(raster.neighborhood(9, 9, Window::square(5)).len(), 9);
        assert_eq!(raster.neighborhood(0, 5, Window::square(5)).len(), 15);
    }

    #[test]
    fn test_window_offsets_are_symmetric_for_odd_sides() {
        let offsets: Vec<_> = Window::square(5).offsets().collect();
        assert_eq!(offsets.len(), 25);
        assert_eq!(offsets[0], (-2, -2));
        assert_eq!(offsets[24], (2, 2));
    }

    #[test]
    fn test_mean_filter_flattens_uniform_regions() {
        let mut raster = Raster::new(RgbImage::from_pixel(6, 6, Rgb([80, 120, 200])));
        raster.apply_mean_filter();
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(raster.pixel(y, x), Rgb([80, 120, 200]));
            }
        }
    }

    #[test]
    fn test_coordinates_are_row_major() {
        let mut raster = checkerboard(4, 8);
        raster.set_pixel(1, 6, Rgb([1, 2, 3]));
        assert_eq!(raster.pixel(1, 6), Rgb([1, 2, 3]));
        assert_eq!(raster.shape(), (4, 8, 3));
    }
}
