use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::image::ImageData;
use crate::stitching::output::types::TiffOutputConfig;

pub trait TiffWriter {
    fn write_tiff(&self, image: &ImageData, output: &mut dyn Write, config: &TiffOutputConfig) -> Result<()>;

    fn write_tiff_file(&self, image: &ImageData, path: &Path, config: &TiffOutputConfig) -> Result<()> {
        info!("Writing {}x{} image to {}", image.width(), image.height(), path.display());
        let file = std::fs::File::create(path)
            .map_err(|e| StitchError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
        let mut output = BufWriter::new(file);
        self.write_tiff(image, &mut output, config)?;
        output.flush()?;
        Ok(())
    }
}
