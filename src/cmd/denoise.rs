use crate::reports;
use clap::Args;
use pixelforge::animation;
use pixelforge::config::Config;
use pixelforge::error::PfResult;
use pixelforge::optimizer::runner::{Denoiser, ProgressCallback, ScanOptions};
use pixelforge::raster::Raster;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Args, Debug, Clone)]
pub struct DenoiseArgs {
    #[command(flatten)]
    pub config: Config,

    /// Noisy input image.
    #[arg(short, long)]
    pub input: String,

    /// Where the restored image is written.
    #[arg(short, long)]
    pub output: String,

    /// Render the scan as an animated GIF at this path.
    #[arg(long)]
    pub gif: Option<String>,

    /// Frame delay of the animation in milliseconds.
    #[arg(long, default_value_t = 15)]
    pub gif_delay: u32,

    /// Per-row scan statistics as CSV.
    #[arg(long)]
    pub csv: Option<String>,

    /// Also run a 3x3 mean filter on a copy and compare timings.
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

struct RowTicker;

impl ProgressCallback for RowTicker {
    fn on_row(&self, row: u32, flagged: usize, commits: usize) -> bool {
        if row % 50 == 0 && row > 0 {
            println!(
                "Row {:5} | Flagged: {:4} | Committed: {:4}",
                row, flagged, commits
            );
        }
        true
    }
}

pub fn run(args: DenoiseArgs, config: Config) -> PfResult<()> {
    println!("📂 Loading image: {}", args.input);
    let mut raster = Raster::open(&args.input)?;
    let (height, width, _) = raster.shape();
    println!("   {}x{} pixels", width, height);

    let baseline_copy = if args.baseline {
        Some(raster.clone())
    } else {
        None
    };

    let denoiser = Denoiser::new(config)?;
    let options = ScanOptions {
        seed: args.seed,
        record_snapshots: args.gif.is_some(),
        max_time: args.time.map(Duration::from_secs),
    };

    println!("\n🧬 === EVOLUTIONARY SCAN === 🧬");
    let scan_start = Instant::now();
    let outcome = denoiser.run(&mut raster, &options, RowTicker)?;
    let scan_elapsed = scan_start.elapsed();

    raster.save(&args.output)?;
    println!("💾 Restored image written to {}", args.output);

    reports::print_scan_report(&outcome.report);

    if let Some(csv_path) = &args.csv {
        reports::write_scan_csv(csv_path, &outcome.report, &outcome.row_marks)?;
        println!("📊 Per-row statistics written to {}", csv_path);
    }

    if let Some(gif_path) = &args.gif {
        if outcome.snapshots.is_empty() {
            println!("ℹ️  No pixels were replaced, skipping the animation.");
        } else {
            animation::render_gif(
                &outcome.snapshots,
                &outcome.row_marks,
                gif_path,
                args.gif_delay,
            )?;
            println!("🎞️  Animation written to {}", gif_path);
        }
    }

    if let Some(mut copy) = baseline_copy {
        println!("\n⚖️  Running the 3x3 mean-filter baseline...");
        let baseline_start = Instant::now();
        copy.apply_mean_filter();
        let baseline_elapsed = baseline_start.elapsed();

        let baseline_path = sibling_with_tag(&args.output, "baseline");
        copy.save(&baseline_path)?;
        println!("💾 Baseline written to {}", baseline_path.display());

        reports::print_timing_comparison(scan_elapsed, baseline_elapsed);
    }

    Ok(())
}

/// "out/clean.png" with tag "baseline" becomes "out/clean.baseline.png".
fn sibling_with_tag(output: &str, tag: &str) -> PathBuf {
    let path = Path::new(output);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let file_name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, tag, ext.to_string_lossy()),
        None => format!("{}.{}", stem, tag),
    };

    path.with_file_name(file_name)
}
