pub mod animation;
pub mod config;
pub mod error;
pub mod noise;
pub mod optimizer;
pub mod raster;
pub mod scorer;
// cmd and reports stay modules of the binary crate (main).
