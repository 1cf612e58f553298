// ===== pixelforge/tests/reproducibility.rs =====
use image::{Rgb, RgbImage};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    noisy_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let noisy_path = dir.path().join("repro_noisy.png");

        let mut image = RgbImage::from_pixel(20, 20, Rgb([110, 110, 110]));
        for &(x, y) in &[(3u32, 3u32), (3, 16), (16, 3), (16, 16), (9, 9)] {
            image.put_pixel(x, y, Rgb([250, 5, 250]));
        }
        image.save(&noisy_path).unwrap();

        Self { dir, noisy_path }
    }
}

fn denoise(ctx: &TestContext, out_name: &str, seed: &str) -> PathBuf {
    let out = ctx.dir.path().join(out_name);
    let output = Command::new("./target/release/pixelforge")
        .args([
            "denoise",
            "-i",
            ctx.noisy_path.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--on-exhaustion",
            "accept-best",
            "--seed",
            seed,
        ])
        .output()
        .expect("Failed to execute binary");

    if !output.status.success() {
        eprintln!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
        panic!("denoise run failed");
    }
    out
}

#[test]
fn test_deterministic_output() {
    let _ = Command::new("cargo")
        .arg("build")
        .arg("--release")
        .status()
        .unwrap();

    let ctx = TestContext::new();

    let out_a = denoise(&ctx, "run_a.png", "12345");
    let out_b = denoise(&ctx, "run_b.png", "12345");

    let bytes_a = fs::read(&out_a).unwrap();
    let bytes_b = fs::read(&out_b).unwrap();
    assert_eq!(
        bytes_a, bytes_b,
        "Determinism check failed: outputs differ for the same seed"
    );

    let pixels_a = image::open(&out_a).unwrap().to_rgb8();
    let noisy = image::open(&ctx.noisy_path).unwrap().to_rgb8();
    let changed = noisy
        .pixels()
        .zip(pixels_a.pixels())
        .filter(|(n, d)| n != d)
        .count();
    assert!(changed > 0, "the scan never touched the planted noise");
}

#[test]
fn test_seeded_injection_is_deterministic() {
    let _ = Command::new("cargo")
        .arg("build")
        .arg("--release")
        .status()
        .unwrap();

    let ctx = TestContext::new();
    let bin = "./target/release/pixelforge";

    let mut outs = Vec::new();
    for name in ["gauss_a.png", "gauss_b.png"] {
        let out = ctx.dir.path().join(name);
        let output = Command::new(bin)
            .args([
                "inject",
                "-i",
                ctx.noisy_path.to_str().unwrap(),
                "-o",
                out.to_str().unwrap(),
                "--model",
                "gaussian",
                "--std-dev",
                "30.0",
                "--seed",
                "777",
            ])
            .output()
            .expect("Failed to execute binary");
        assert!(output.status.success());
        outs.push(fs::read(&out).unwrap());
    }

    assert_eq!(outs[0], outs[1], "same seed produced different noise");
}
