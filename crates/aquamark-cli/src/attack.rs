use std::path::PathBuf;

use aquamark_recover::attack;
use aquamark_recover::CropBox;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{io, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AttackKind {
    Brightness,
    SaltPepper,
    Shelter,
    Crop,
    Resize,
    Rotate,
}

#[derive(Debug, clap::Args)]
pub struct AttackArgs {
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(long, value_enum)]
    pub kind: AttackKind,
    /// Brightness factor, noise density, or shelter block size.
    #[arg(long)]
    pub ratio: Option<f64>,
    /// Number of shelter blocks.
    #[arg(long, default_value_t = 3)]
    pub count: usize,
    /// Crop box as x1,y1,x2,y2.
    #[arg(long, value_parser = parse_crop_box)]
    pub crop: Option<CropBox>,
    /// Target width for resize.
    #[arg(long)]
    pub width: Option<usize>,
    /// Target height for resize.
    #[arg(long)]
    pub height: Option<usize>,
    /// Rotation angle in degrees.
    #[arg(long, default_value_t = 45.0)]
    pub angle: f32,
    /// Seed for the randomised attacks.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub fn handle_attack(args: AttackArgs) -> Result<()> {
    let img = io::load_bgr(&args.input)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let attacked = match args.kind {
        AttackKind::Brightness => attack::brightness(&img, args.ratio.unwrap_or(0.9) as f32),
        AttackKind::SaltPepper => attack::salt_pepper(&img, args.ratio.unwrap_or(0.01), &mut rng),
        AttackKind::Shelter => {
            attack::shelter(&img, args.ratio.unwrap_or(0.1), args.count, &mut rng)
        }
        AttackKind::Crop => {
            let crop = args
                .crop
                .ok_or(Error::InvalidArgs("--crop is required for the crop attack"))?;
            if crop.x2 > img.width() || crop.y2 > img.height() || crop.x1 >= crop.x2 || crop.y1 >= crop.y2 {
                return Err(Error::InvalidArgs("--crop box exceeds the image"));
            }
            attack::crop(&img, crop)
        }
        AttackKind::Resize => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err(Error::InvalidArgs(
                    "--width and --height are required for the resize attack",
                ));
            };
            attack::scale_to(&img, width, height)
        }
        AttackKind::Rotate => attack::rotate(&img, args.angle),
    };

    io::save_bgr(&args.output, &attacked, None)?;
    Ok(())
}

fn parse_crop_box(value: &str) -> std::result::Result<CropBox, String> {
    let parts: Vec<&str> = value.split(',').collect();
    let [x1, y1, x2, y2] = parts.as_slice() else {
        return Err("expected x1,y1,x2,y2".into());
    };
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|e| e.to_string());
    let (x1, y1, x2, y2) = (parse(x1)?, parse(y1)?, parse(x2)?, parse(y2)?);
    if x1 >= x2 || y1 >= y2 {
        return Err("crop box must have positive width and height".into());
    }
    Ok(CropBox { x1, y1, x2, y2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_boxes_parse() {
        let crop = parse_crop_box("10,20,110,220").unwrap();
        assert_eq!(
            crop,
            CropBox {
                x1: 10,
                y1: 20,
                x2: 110,
                y2: 220
            }
        );
        assert!(parse_crop_box("10,20,110").is_err());
        assert!(parse_crop_box("10,20,5,220").is_err());
        assert!(parse_crop_box("a,b,c,d").is_err());
    }
}
