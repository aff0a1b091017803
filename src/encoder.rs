use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ProjectionError, Result},
    raster::RasterGrid,
};

/// On-disk representation of a projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactFormat {
    /// 8-bit greyscale heat map
    #[default]
    Png,
    /// the raw numeric grid
    Json,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Png => "png",
            ArtifactFormat::Json => "json",
        }
    }
}

/// Serializes raster grids to artifact bytes.
pub struct Encoder<'a> {
    grid: &'a RasterGrid,
}

impl<'a> Encoder<'a> {
    pub fn new(grid: &'a RasterGrid) -> Self {
        Self { grid }
    }

    pub fn encode(&self, format: ArtifactFormat) -> Result<Vec<u8>> {
        match format {
            ArtifactFormat::Png => self.encode_png(),
            ArtifactFormat::Json => self.encode_json(),
        }
    }

    /// Log-scaled heat map with dark cells where values are high.
    ///
    /// Values go through ln(v + 1) and are mapped linearly from -1 (white) to
    /// half the largest log value (black), clipping above. Row 0 of the grid
    /// ends up at the bottom of the image.
    pub fn encode_gray(&self) -> GrayImage {
        let log = |v: f64| (v.max(0.) + 1.).ln();
        let vmin = -1.;
        let vmax = (log(self.grid.max()) * 0.5).max(0.);
        let span = vmax - vmin;

        let mut img = GrayImage::new(self.grid.cols as u32, self.grid.rows as u32);
        self.grid.rows_top_down().enumerate().for_each(|(y, row)| {
            row.iter().enumerate().for_each(|(x, v)| {
                let t = ((log(*v) - vmin) / span).clamp(0., 1.);
                let level = ((1. - t) * (u8::MAX as f64)).round() as u8;
                img.put_pixel(x as u32, y as u32, Luma([level]));
            });
        });

        img
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.encode_gray()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ProjectionError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self.grid).map_err(|e| ProjectionError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RasterGrid {
        let mut grid = RasterGrid::new(2, 3, 0.5, [-1., -2.]);
        grid[(0, 0)] = 100.;
        grid[(1, 2)] = 1.;
        grid
    }

    #[test]
    fn gray_image_is_flipped_and_inverted() {
        let img = Encoder::new(&grid()).encode_gray();
        assert_eq!(img.dimensions(), (3, 2));
        // row 0 of the grid is the bottom image row
        assert_eq!(img.get_pixel(0, 1)[0], 0);
        // empty cells stay light
        assert!(img.get_pixel(1, 1)[0] > 100);
        assert!(img.get_pixel(2, 0)[0] < img.get_pixel(1, 0)[0]);
    }

    #[test]
    fn png_is_deterministic() {
        let grid = grid();
        let a = Encoder::new(&grid).encode(ArtifactFormat::Png).unwrap();
        let b = Encoder::new(&grid).encode(ArtifactFormat::Png).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");

        let decoded = image::load_from_memory(&a).unwrap().to_luma8();
        assert_eq!(decoded, Encoder::new(&grid).encode_gray());
    }

    #[test]
    fn json_keeps_the_numeric_grid() {
        let grid = grid();
        let bytes = Encoder::new(&grid).encode(ArtifactFormat::Json).unwrap();
        let back: RasterGrid = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, grid);
        assert_eq!(ArtifactFormat::Json.extension(), "json");
    }
}
