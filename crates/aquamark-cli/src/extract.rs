use std::path::PathBuf;

use aquamark::Watermarker;

use crate::commands::CodecArgs;
use crate::{io, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Bits,
    Bitmap,
}

#[derive(Debug, clap::Args)]
pub struct ExtractArgs {
    /// Watermarked image.
    #[arg(short, long)]
    pub input: PathBuf,
    /// Payload format embedded in the image.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Payload bit length, as printed by embed (text and bits formats).
    #[arg(long)]
    pub len: Option<usize>,
    /// Bitmap payload width.
    #[arg(long)]
    pub width: Option<usize>,
    /// Bitmap payload height.
    #[arg(long)]
    pub height: Option<usize>,
    /// Output path for the extracted bitmap.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub codec: CodecArgs,
}

pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    let img = io::load_bgr(&args.input)?;
    let marker = Watermarker::new(args.codec.config())?;

    match args.format {
        Format::Text => {
            let len = args
                .len
                .ok_or(Error::InvalidArgs("--len is required for text payloads"))?;
            println!("{}", marker.extract_text(&img, len)?);
        }
        Format::Bits => {
            let len = args
                .len
                .ok_or(Error::InvalidArgs("--len is required for bit payloads"))?;
            let bits = marker.extract_bits(&img, len)?;
            let line: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
            println!("{line}");
        }
        Format::Bitmap => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err(Error::InvalidArgs(
                    "--width and --height are required for bitmap payloads",
                ));
            };
            let output = args.output.as_deref().ok_or(Error::InvalidArgs(
                "--output is required for bitmap payloads",
            ))?;
            let bitmap = marker.extract_bitmap(&img, width, height)?;
            io::save_gray(output, &bitmap)?;
            tracing::info!(output = %output.display(), "Wrote extracted bitmap");
        }
    }
    Ok(())
}
