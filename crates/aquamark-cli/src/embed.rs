use std::path::PathBuf;

use aquamark::{payload, Watermarker};

use crate::commands::CodecArgs;
use crate::{io, Error, Result};

#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("payload").required(true).args(["text", "bitmap", "bits"]))]
pub struct EmbedArgs {
    /// Cover image.
    #[arg(short, long)]
    pub input: PathBuf,
    /// Watermarked output image.
    #[arg(short, long)]
    pub output: PathBuf,
    /// Text payload.
    #[arg(long)]
    pub text: Option<String>,
    /// Grayscale bitmap payload; thresholded at mid-gray.
    #[arg(long)]
    pub bitmap: Option<PathBuf>,
    /// Raw bit payload, a string of 0s and 1s.
    #[arg(long)]
    pub bits: Option<String>,
    /// JPEG quality for .jpg/.jpeg outputs.
    #[arg(long)]
    pub jpeg_quality: Option<u8>,
    #[command(flatten)]
    pub codec: CodecArgs,
}

pub fn handle_embed(args: EmbedArgs) -> Result<()> {
    let cover = io::load_bgr(&args.input)?;
    let marker = Watermarker::new(args.codec.config())?;

    let bits: Vec<bool> = if let Some(text) = &args.text {
        payload::text_to_bits(text)
    } else if let Some(path) = &args.bitmap {
        let bitmap = io::load_gray(path)?;
        tracing::info!(
            width = bitmap.width(),
            height = bitmap.height(),
            "Bitmap payload; keep the dimensions for extraction"
        );
        payload::bitmap_to_bits(&bitmap)
    } else if let Some(bits) = &args.bits {
        parse_bits(bits)?
    } else {
        unreachable!("clap enforces the payload group");
    };

    let marked = marker.embed_bits(&cover, &bits)?;
    io::save_bgr(&args.output, &marked, args.jpeg_quality)?;

    tracing::info!(
        capacity = marker.capacity(cover.width(), cover.height())?,
        "Embedded payload"
    );
    // the caller must pass this back as --len when extracting
    println!("{}", bits.len());
    Ok(())
}

fn parse_bits(bits: &str) -> Result<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(Error::InvalidArgs("--bits accepts only 0 and 1 characters")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_strings_parse_strictly() {
        assert_eq!(parse_bits("0110").unwrap(), [false, true, true, false]);
        assert!(parse_bits("01x0").is_err());
        assert!(parse_bits("").unwrap().is_empty());
    }
}
