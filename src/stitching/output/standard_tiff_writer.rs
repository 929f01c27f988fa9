use std::io::{Cursor, Write};

use tiff::encoder::{Compression, TiffEncoder, colortype, compression::DeflateLevel};
use tiff::tags::Predictor;
use tracing::debug;

use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::image::{ImageData, PixelData};
use crate::stitching::output::types::{TiffCompression, TiffOutputConfig};
use crate::stitching::output::writer::TiffWriter;

/// Writes gray, RGB or RGBA images with 8-bit, 16-bit or float samples.
pub struct StandardTiffWriter;

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(&self, image: &ImageData, output: &mut dyn Write, config: &TiffOutputConfig) -> Result<()> {
        debug!(
            "Encoding TIFF image: {}x{}x{} {:?}",
            image.width(),
            image.height(),
            image.channels(),
            image.pixel_type()
        );

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| StitchError::EncodeError(e.to_string()))?
            .with_compression(compression);

        let is_float = matches!(image.data(), PixelData::F32(_));
        if let Some(predictor_val) = config.predictor.filter(|_| !is_float) {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let (w, h) = (image.width() as u32, image.height() as u32);
        let written = match (image.data(), image.channels()) {
            (PixelData::U8(data), 1) => encoder.write_image::<colortype::Gray8>(w, h, data),
            (PixelData::U8(data), 3) => encoder.write_image::<colortype::RGB8>(w, h, data),
            (PixelData::U8(data), 4) => encoder.write_image::<colortype::RGBA8>(w, h, data),
            (PixelData::U16(data), 1) => encoder.write_image::<colortype::Gray16>(w, h, data),
            (PixelData::U16(data), 3) => encoder.write_image::<colortype::RGB16>(w, h, data),
            (PixelData::U16(data), 4) => encoder.write_image::<colortype::RGBA16>(w, h, data),
            (PixelData::F32(data), 1) => encoder.write_image::<colortype::Gray32Float>(w, h, data),
            (PixelData::F32(data), 3) => encoder.write_image::<colortype::RGB32Float>(w, h, data),
            (PixelData::F32(data), 4) => encoder.write_image::<colortype::RGBA32Float>(w, h, data),
            (_, channels) => {
                return Err(StitchError::EncodeError(format!(
                    "unsupported channel count for TIFF output: {}",
                    channels
                )));
            }
        };
        written.map_err(|e| StitchError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::decoder::{Decoder, DecodingResult};

    fn gradient_u16(width: usize, height: usize) -> ImageData {
        let data = (0..width * height).map(|i| (i * 31) as u16).collect();
        ImageData::new(width, height, 1, PixelData::U16(data)).unwrap()
    }

    fn decode(bytes: Vec<u8>) -> (u32, u32, DecodingResult) {
        let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
        let (w, h) = decoder.dimensions().unwrap();
        (w, h, decoder.read_image().unwrap())
    }

    #[test]
    fn test_gray16_round_trip_with_compression() {
        let image = gradient_u16(32, 8);
        for compression in [TiffCompression::None, TiffCompression::Lzw, TiffCompression::DeflateBest] {
            let config = TiffOutputConfig::builder()
                .compression(compression)
                .predictor(Some(2))
                .build();
            let mut bytes = Vec::new();
            StandardTiffWriter.write_tiff(&image, &mut bytes, &config).unwrap();

            let (w, h, decoded) = decode(bytes);
            assert_eq!((w, h), (32, 8));
            match decoded {
                DecodingResult::U16(data) => assert_eq!(&PixelData::U16(data), image.data()),
                _ => panic!("expected 16-bit samples"),
            }
        }
    }

    #[test]
    fn test_rgb8_output() {
        let data: Vec<u8> = (0..4 * 2 * 3).map(|i| i as u8).collect();
        let image = ImageData::new(4, 2, 3, PixelData::U8(data.clone())).unwrap();
        let mut bytes = Vec::new();
        StandardTiffWriter
            .write_tiff(&image, &mut bytes, &TiffOutputConfig::default())
            .unwrap();

        match decode(bytes).2 {
            DecodingResult::U8(decoded) => assert_eq!(decoded, data),
            _ => panic!("expected 8-bit samples"),
        }
    }

    #[test]
    fn test_float_output_ignores_predictor() {
        let image = ImageData::new(2, 2, 1, PixelData::F32(vec![0.5, 1.5, 2.5, 3.5])).unwrap();
        let config = TiffOutputConfig::builder().predictor(Some(2)).build();
        let mut bytes = Vec::new();
        StandardTiffWriter.write_tiff(&image, &mut bytes, &config).unwrap();

        match decode(bytes).2 {
            DecodingResult::F32(decoded) => assert_eq!(decoded, vec![0.5, 1.5, 2.5, 3.5]),
            _ => panic!("expected float samples"),
        }
    }

    #[test]
    fn test_unsupported_channel_count() {
        let image = ImageData::new(2, 2, 2, PixelData::U8(vec![0; 8])).unwrap();
        let result = StandardTiffWriter.write_tiff(&image, &mut Vec::<u8>::new(), &TiffOutputConfig::default());
        assert!(matches!(result, Err(StitchError::EncodeError(_))));
    }

    #[test]
    fn test_write_tiff_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stitched.tiff");
        let image = gradient_u16(16, 4);
        StandardTiffWriter
            .write_tiff_file(&image, &path, &TiffOutputConfig::default())
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(decode(bytes).0, 16);
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = TiffOutputConfig::builder().build();
        assert_eq!(config, TiffOutputConfig::default());
        assert_eq!(config.compression, TiffCompression::None);
        assert_eq!(config.predictor, None);
    }
}
