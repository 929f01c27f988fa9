//! Image buffer types

use crate::stitching::common::error::{Result, StitchError};

/// Storage type of a frame's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    U8,
    U16,
    F32,
}

/// Interleaved, row-major sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl PixelData {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelData::U8(_) => PixelType::U8,
            PixelData::U16(_) => PixelType::U16,
            PixelData::F32(_) => PixelType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(data) => data.len(),
            PixelData::U16(data) => data.len(),
            PixelData::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn zeros(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::U8 => PixelData::U8(vec![0; len]),
            PixelType::U16 => PixelData::U16(vec![0; len]),
            PixelType::F32 => PixelData::F32(vec![0.0; len]),
        }
    }

    fn from_samples(pixel_type: PixelType, samples: &[f32]) -> Self {
        match pixel_type {
            PixelType::U8 => PixelData::U8(samples.iter().map(|&v| u8::from_f32(v)).collect()),
            PixelType::U16 => PixelData::U16(samples.iter().map(|&v| u16::from_f32(v)).collect()),
            PixelType::F32 => PixelData::F32(samples.to_vec()),
        }
    }
}

/// Conversion between a storage sample and the `f32` working type
pub trait Sample: Copy + Send + Sync {
    fn to_f32(self) -> f32;
    /// Rounds and saturates to the type's range.
    fn from_f32(value: f32) -> Self;
}

impl Sample for u8 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, u8::MAX as f32) as u8
    }
}

impl Sample for u16 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, u16::MAX as f32) as u16
    }
}

impl Sample for f32 {
    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(value: f32) -> Self {
        value
    }
}

/// A camera frame or a stitched result
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: usize,
    height: usize,
    channels: usize,
    data: PixelData,
}

impl ImageData {
    pub fn new(width: usize, height: usize, channels: usize, data: PixelData) -> Result<Self> {
        if channels == 0 {
            return Err(StitchError::InvalidImageBuffer(
                "channel count must be at least 1".into(),
            ));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(StitchError::InvalidImageBuffer(format!(
                "{}x{}x{} image needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn zeros(width: usize, height: usize, channels: usize, pixel_type: PixelType) -> Self {
        Self {
            width,
            height,
            channels,
            data: PixelData::zeros(pixel_type, width * height * channels),
        }
    }

    /// Converts a float buffer back to `pixel_type`, rounding and saturating integer samples.
    pub fn from_float(image: &FloatImage, pixel_type: PixelType) -> Self {
        Self {
            width: image.width,
            height: image.height,
            channels: image.channels,
            data: PixelData::from_samples(pixel_type, &image.data),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn pixel_type(&self) -> PixelType {
        self.data.pixel_type()
    }

    pub fn into_data(self) -> PixelData {
        self.data
    }
}

/// `f32` working buffer with the same layout as [`ImageData`]
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        }
    }

    pub fn add_scalar(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v += value);
    }

    /// Samples of pixel `(x, y)`, one per channel.
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_sample_count() {
        let result = ImageData::new(4, 2, 1, PixelData::U8(vec![0; 7]));
        assert!(matches!(result, Err(StitchError::InvalidImageBuffer(_))));

        let result = ImageData::new(4, 2, 0, PixelData::U8(vec![]));
        assert!(matches!(result, Err(StitchError::InvalidImageBuffer(_))));
    }

    #[test]
    fn test_from_float_rounds_and_saturates() {
        let float = FloatImage {
            width: 4,
            height: 1,
            channels: 1,
            data: vec![-3.0, 15999.6, 70000.0, 12.4],
        };

        let image = ImageData::from_float(&float, PixelType::U16);
        assert_eq!(image.data(), &PixelData::U16(vec![0, 16000, 65535, 12]));

        let image = ImageData::from_float(&float, PixelType::U8);
        assert_eq!(image.data(), &PixelData::U8(vec![0, 255, 255, 12]));
    }

    #[test]
    fn test_zeros_keeps_pixel_type() {
        let image = ImageData::zeros(3, 2, 3, PixelType::F32);
        assert_eq!(image.pixel_type(), PixelType::F32);
        assert_eq!(image.data().len(), 18);
    }
}
