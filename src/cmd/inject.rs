use clap::Args;
use pixelforge::error::PfResult;
use pixelforge::noise::{self, NoiseModel, NoiseOptions};
use pixelforge::raster::Raster;

#[derive(Args, Debug, Clone)]
pub struct InjectArgs {
    /// Clean input image.
    #[arg(short, long)]
    pub input: String,

    /// Where the corrupted image is written.
    #[arg(short, long)]
    pub output: String,

    /// Noise model: salt-pepper, chroma, periodic or gaussian.
    #[arg(short, long)]
    pub model: NoiseModel,

    #[command(flatten)]
    pub options: NoiseOptions,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

pub fn run(args: InjectArgs) -> PfResult<()> {
    println!("📂 Loading image: {}", args.input);
    let mut raster = Raster::open(&args.input)?;

    let mut rng = if let Some(s) = args.seed {
        fastrand::Rng::with_seed(s)
    } else {
        fastrand::Rng::new()
    };

    println!("🧪 Injecting {} noise...", args.model);
    noise::apply(args.model, &mut raster, &args.options, &mut rng);

    raster.save(&args.output)?;
    println!("💾 Corrupted image written to {}", args.output);

    Ok(())
}
