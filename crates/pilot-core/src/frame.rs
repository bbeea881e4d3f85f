//! Rendered-frame capture and PNG/base64 encoding for the oracle payload.

use std::io::Cursor;
use std::{error::Error, fmt};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

/// One rendered simulation state: a row-major grid of RGB triples.
///
/// Frames are ephemeral; the driver captures one per decision cycle, encodes
/// it, and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<Vec<[u8; 3]>>,
}

/// The frame's declared dimensions disagree with its pixel grid, or the PNG
/// encoder rejected the buffer. Fatal to the current cycle: there is no
/// frame to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    EmptyDimensions { width: u32, height: u32 },
    RowCountMismatch { expected: u32, actual: usize },
    RowWidthMismatch { row: usize, expected: u32, actual: usize },
    PngEncode(String),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::EmptyDimensions { width, height } => {
                write!(f, "frame dimensions must be >= 1, got {width}x{height}")
            }
            EncodingError::RowCountMismatch { expected, actual } => {
                write!(f, "frame declares {expected} rows but has {actual}")
            }
            EncodingError::RowWidthMismatch {
                row,
                expected,
                actual,
            } => {
                write!(f, "row {row} has {actual} pixels, expected {expected}")
            }
            EncodingError::PngEncode(msg) => write!(f, "png encode failed: {msg}"),
        }
    }
}

impl Error for EncodingError {}

impl Frame {
    pub fn new(width: u32, height: u32, rows: Vec<Vec<[u8; 3]>>) -> Self {
        Self {
            width,
            height,
            rows,
        }
    }

    fn validate(&self) -> Result<(), EncodingError> {
        if self.width == 0 || self.height == 0 {
            return Err(EncodingError::EmptyDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.rows.len() != self.height as usize {
            return Err(EncodingError::RowCountMismatch {
                expected: self.height,
                actual: self.rows.len(),
            });
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.width as usize {
                return Err(EncodingError::RowWidthMismatch {
                    row: i,
                    expected: self.width,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Encodes the frame as a PNG and returns it base64-encoded for embedding
    /// in the oracle request. Pure; deterministic for identical input.
    pub fn encode_png_base64(&self) -> Result<String, EncodingError> {
        self.validate()?;

        let mut raw = Vec::with_capacity(self.rows.len() * self.width as usize * 3);
        for row in &self.rows {
            for px in row {
                raw.extend_from_slice(px);
            }
        }
        let img = RgbImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
            EncodingError::PngEncode("pixel buffer does not match dimensions".to_string())
        })?;

        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)
            .map_err(|e| EncodingError::PngEncode(e.to_string()))?;

        Ok(BASE64.encode(png.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_2x2() -> Frame {
        Frame::new(
            2,
            2,
            vec![
                vec![[255, 0, 0], [0, 255, 0]],
                vec![[0, 0, 255], [255, 255, 255]],
            ],
        )
    }

    #[test]
    fn encode_round_trips_through_png() {
        let encoded = frame_2x2().encode_png_base64().unwrap();
        let png = BASE64.decode(encoded).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn encode_is_deterministic() {
        let frame = frame_2x2();
        assert_eq!(
            frame.encode_png_base64().unwrap(),
            frame.encode_png_base64().unwrap()
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let frame = Frame::new(0, 1, vec![vec![]]);
        assert_eq!(
            frame.encode_png_base64(),
            Err(EncodingError::EmptyDimensions {
                width: 0,
                height: 1
            })
        );
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let frame = Frame::new(1, 3, vec![vec![[0, 0, 0]], vec![[0, 0, 0]]]);
        assert_eq!(
            frame.encode_png_base64(),
            Err(EncodingError::RowCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn ragged_row_is_rejected() {
        let frame = Frame::new(
            2,
            2,
            vec![vec![[0, 0, 0], [0, 0, 0]], vec![[0, 0, 0]]],
        );
        assert_eq!(
            frame.encode_png_base64(),
            Err(EncodingError::RowWidthMismatch {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }
}
