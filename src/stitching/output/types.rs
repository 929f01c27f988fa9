//! TIFF output configuration types

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, fast level
    DeflateFast,
    /// Deflate compression, balanced level
    DeflateBalanced,
    /// Deflate compression, best ratio
    DeflateBest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiffOutputConfig {
    pub compression: TiffCompression,
    /// TIFF predictor tag value; 2 selects horizontal differencing.
    /// Ignored for floating point output.
    pub predictor: Option<u16>,
}

impl Default for TiffOutputConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
        }
    }
}

impl TiffOutputConfig {
    pub fn builder() -> TiffOutputConfigBuilder {
        TiffOutputConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct TiffOutputConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
}

impl TiffOutputConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn build(self) -> TiffOutputConfig {
        let default = TiffOutputConfig::default();
        TiffOutputConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
        }
    }
}
