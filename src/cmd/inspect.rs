use crate::reports;
use clap::Args;
use pixelforge::config::{Config, DetectionParams};
use pixelforge::error::PfResult;
use pixelforge::raster::Raster;
use pixelforge::scorer;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub detection: DetectionParams,

    /// Image to audit.
    #[arg(short, long)]
    pub input: String,

    /// Per-row flag counts as CSV.
    #[arg(long)]
    pub csv: Option<String>,
}

pub fn run(args: InspectArgs, config: Config) -> PfResult<()> {
    println!("📂 Loading image: {}", args.input);
    let raster = Raster::open(&args.input)?;
    let (height, width, _) = raster.shape();
    println!("   {}x{} pixels", width, height);

    println!("\n🔎 === NOISE AUDIT === 🔎");
    let audit = scorer::audit_raster(&raster, &config.detection);
    reports::print_audit_report(&audit, &config.detection);

    if let Some(csv_path) = &args.csv {
        reports::write_audit_csv(csv_path, &audit)?;
        println!("📊 Per-row counts written to {}", csv_path);
    }

    Ok(())
}
