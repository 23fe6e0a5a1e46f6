use aquamark::{
    payload, BlockShape, Error, Image, Plane, PoolMode, WatermarkConfig, Watermarker,
};

/// Deterministic "natural" cover: smooth waves plus low-amplitude noise.
fn synthetic_cover(width: usize, height: usize, channels: usize) -> Image {
    let mut data = Vec::with_capacity(width * height * channels);
    let mut state = 0x1234_5678u32;
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let wave = ((x as f32 * 0.071 + c as f32 * 1.3).sin()
                    + (y as f32 * 0.053).cos())
                    * 38.0;
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = (state >> 24) as f32 / 8.0;
                data.push((128.0 + wave + noise).clamp(0.0, 255.0) as u8);
            }
            if channels == 4 {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                data.push(200u8.wrapping_add((state >> 26) as u8));
            }
        }
    }
    Image::from_vec(width, height, channels, data)
}

fn random_bits(len: usize, seed: u32) -> Vec<bool> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            state >> 31 == 1
        })
        .collect()
}

fn accuracy(a: &[bool], b: &[bool]) -> f64 {
    assert_eq!(a.len(), b.len());
    let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}

fn default_marker() -> Watermarker {
    Watermarker::new(WatermarkConfig::default()).unwrap()
}

#[test]
fn text_payload_roundtrip() {
    let cover = synthetic_cover(128, 128, 3);
    let marker = default_marker();
    let (marked, len) = marker.embed_text(&cover, "hello").unwrap();
    assert_eq!(len, 39);
    assert_eq!(marker.extract_text(&marked, len).unwrap(), "hello");
}

#[test]
fn bit_payload_roundtrip() {
    let cover = synthetic_cover(160, 160, 3);
    let bits = random_bits(256, 7);
    let marker = default_marker();
    let marked = marker.embed_bits(&cover, &bits).unwrap();
    assert_eq!(marker.extract_bits(&marked, bits.len()).unwrap(), bits);
}

#[test]
fn bitmap_payload_roundtrip() {
    let cover = synthetic_cover(160, 160, 3);
    let bitmap = Plane::from_vec(
        8,
        8,
        (0..64).map(|i| if i % 5 == 0 { 255 } else { 0 }).collect(),
    );
    let marker = default_marker();
    let marked = marker.embed_bitmap(&cover, &bitmap).unwrap();
    let extracted = marker.extract_bitmap(&marked, 8, 8).unwrap();
    assert_eq!(extracted.buf(), payload::bits_to_bitmap(
        &payload::bitmap_to_bits(&bitmap), 8, 8).unwrap().buf());
}

#[test]
fn translucent_alpha_passes_through() {
    let cover = synthetic_cover(64, 64, 4);
    assert!(cover.data().iter().skip(3).step_by(4).any(|&a| a < 255));
    let marker = default_marker();
    let (marked, _) = marker.embed_text(&cover, "alpha").unwrap();
    assert_eq!(marked.channels(), 4);
    let alpha_in: Vec<u8> = cover.data().iter().skip(3).step_by(4).copied().collect();
    let alpha_out: Vec<u8> = marked.data().iter().skip(3).step_by(4).copied().collect();
    assert_eq!(alpha_in, alpha_out);
}

#[test]
fn payload_equal_to_capacity_is_rejected() {
    // 32x32 cover -> 16x16 LL -> 16 blocks
    let cover = synthetic_cover(32, 32, 3);
    let marker = default_marker();
    assert_eq!(marker.capacity(32, 32).unwrap(), 16);

    let err = marker.embed_bits(&cover, &random_bits(16, 1)).unwrap_err();
    assert!(matches!(
        err,
        Error::WatermarkTooLarge {
            required: 16,
            capacity: 16
        }
    ));
    assert!(marker.embed_bits(&cover, &random_bits(15, 1)).is_ok());
}

#[test]
fn tiny_cover_is_rejected() {
    let cover = synthetic_cover(6, 6, 3);
    let marker = default_marker();
    assert!(matches!(
        marker.embed_bits(&cover, &[true]),
        Err(Error::ImageTooSmall(_))
    ));
}

#[test]
fn embedding_is_deterministic() {
    let cover = synthetic_cover(96, 96, 3);
    let bits = random_bits(64, 3);
    let marker = default_marker();
    let a = marker.embed_bits(&cover, &bits).unwrap();
    let b = marker.embed_bits(&cover, &bits).unwrap();
    assert_eq!(a.data(), b.data());
}

#[test]
fn pool_modes_are_bit_exact() {
    let cover = synthetic_cover(120, 88, 3);
    let bits = random_bits(48, 9);
    let mut images = Vec::new();
    let mut vectors = Vec::new();
    for mode in [
        PoolMode::Serial,
        PoolMode::Threaded,
        PoolMode::Process,
        PoolMode::Vectorized,
    ] {
        let marker = Watermarker::new(WatermarkConfig {
            pool_mode: mode,
            workers: Some(4),
            ..WatermarkConfig::default()
        })
        .unwrap();
        let marked = marker.embed_bits(&cover, &bits).unwrap();
        vectors.push(marker.extract_soft(&marked, bits.len()).unwrap());
        images.push(marked);
    }
    for marked in &images[1..] {
        assert_eq!(marked.data(), images[0].data());
    }
    for vector in &vectors[1..] {
        assert_eq!(vector, &vectors[0]);
    }
}

#[test]
fn wrong_keys_recover_nothing() {
    let cover = synthetic_cover(256, 256, 3);
    let bits = random_bits(64, 21);
    let marker = default_marker();
    let marked = marker.embed_bits(&cover, &bits).unwrap();

    let wrong_wm = Watermarker::new(WatermarkConfig {
        wm_key: 2,
        ..WatermarkConfig::default()
    })
    .unwrap();
    let extracted = wrong_wm.extract_bits(&marked, bits.len()).unwrap();
    assert!(accuracy(&extracted, &bits) < 0.85);

    let wrong_img = Watermarker::new(WatermarkConfig {
        img_key: 2,
        ..WatermarkConfig::default()
    })
    .unwrap();
    let extracted = wrong_img.extract_bits(&marked, bits.len()).unwrap();
    assert!(accuracy(&extracted, &bits) < 0.85);
}

#[test]
fn fast_mode_roundtrip() {
    let cover = synthetic_cover(128, 128, 3);
    let marker = Watermarker::new(WatermarkConfig {
        d2: 0.0,
        ..WatermarkConfig::default()
    })
    .unwrap();
    let (marked, len) = marker.embed_text(&cover, "fast").unwrap();
    assert_eq!(marker.extract_text(&marked, len).unwrap(), "fast");
}

#[test]
fn custom_block_shape_roundtrip() {
    let cover = synthetic_cover(192, 192, 3);
    let marker = Watermarker::new(WatermarkConfig {
        block: BlockShape::new(8, 8),
        ..WatermarkConfig::default()
    })
    .unwrap();
    let bits = random_bits(32, 4);
    let marked = marker.embed_bits(&cover, &bits).unwrap();
    assert_eq!(marker.extract_bits(&marked, bits.len()).unwrap(), bits);
}

#[test]
fn survives_jpeg_quality_85() {
    let cover = synthetic_cover(256, 256, 3);
    let bits = random_bits(64, 15);
    let marker = default_marker();
    let marked = marker.embed_bits(&cover, &bits).unwrap();

    // BGR -> RGB, encode at quality 85, decode, RGB -> BGR
    let rgb: Vec<u8> = marked
        .data()
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    let mut jpeg = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 85);
    encoder
        .encode(&rgb, 256, 256, image::ExtendedColorType::Rgb8)
        .unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    let bgr: Vec<u8> = decoded
        .as_raw()
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    let attacked = Image::from_vec(256, 256, 3, bgr);

    assert_eq!(marker.extract_bits(&attacked, bits.len()).unwrap(), bits);
}
