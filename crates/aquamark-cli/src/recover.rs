use std::path::PathBuf;

use aquamark_recover::{estimate_crop, recover_crop};

use crate::{io, Result};

#[derive(Debug, clap::Args)]
pub struct RecoverArgs {
    /// The original (watermarked) image the attacked copy came from.
    #[arg(long)]
    pub original: PathBuf,
    /// The attacked image: cropped and possibly rescaled.
    #[arg(long)]
    pub attacked: PathBuf,
    /// Where to write the recovered, re-aligned image.
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(long, default_value_t = 0.5)]
    pub scale_min: f64,
    #[arg(long, default_value_t = 2.0)]
    pub scale_max: f64,
    /// Number of scales probed in the coarse sweep.
    #[arg(long, default_value_t = 200)]
    pub steps: usize,
}

pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let original = io::load_bgr(&args.original)?;
    let attacked = io::load_bgr(&args.attacked)?;

    let estimate = estimate_crop(
        &original,
        &attacked,
        (args.scale_min, args.scale_max),
        args.steps,
    )?;
    tracing::info!(
        x1 = estimate.crop.x1,
        y1 = estimate.crop.y1,
        x2 = estimate.crop.x2,
        y2 = estimate.crop.y2,
        scale = estimate.scale,
        score = estimate.score,
        "Estimated crop parameters"
    );
    println!(
        "{} {} {} {} scale={:.4} score={:.4}",
        estimate.crop.x1, estimate.crop.y1, estimate.crop.x2, estimate.crop.y2,
        estimate.scale, estimate.score,
    );

    let recovered = recover_crop(&attacked, estimate.crop, estimate.original_size);
    io::save_bgr(&args.output, &recovered, None)?;
    Ok(())
}
