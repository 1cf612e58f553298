pub mod denoise;
pub mod inject;
pub mod inspect;
