//! BGR frame buffers.
//!
//! Decoded video is scaled to packed BGR24 and copied out of the FFmpeg
//! frame into a [`BgrImage`]: `height × width × 3` bytes, row-major, no
//! padding.

use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbImage;

use crate::error::LoadVideoError;

/// A packed 8-bit image in blue-green-red channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BgrImage {
    /// Number of channels per pixel.
    pub const CHANNELS: usize = 3;

    /// Wrap a packed BGR buffer. Returns `None` when the buffer length is
    /// not `width × height × 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Array shape as `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, Self::CHANNELS)
    }

    /// The `[b, g, r]` triple at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        let bytes = &self.data[offset..offset + Self::CHANNELS];
        Some([bytes[0], bytes[1], bytes[2]])
    }

    /// The packed pixel bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return the packed pixel bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Convert to an [`image::RgbImage`], swapping the channel order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadVideoError::Decode`] if the buffer cannot back an RGB
    /// image of the same dimensions.
    pub fn to_rgb_image(&self) -> Result<RgbImage, LoadVideoError> {
        let mut rgb = self.data.clone();
        for pixel in rgb.chunks_exact_mut(Self::CHANNELS) {
            pixel.swap(0, 2);
        }
        RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
            LoadVideoError::Decode(
                "Failed to construct RGB image from BGR frame data".to_string(),
            )
        })
    }
}

/// Copy a packed BGR24 FFmpeg frame into a [`BgrImage`], dropping per-row
/// stride padding.
pub(crate) fn bgr_frame_to_image(frame: &VideoFrame) -> Result<BgrImage, LoadVideoError> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = width as usize * BgrImage::CHANNELS;
    let stride = frame.stride(0);
    let data = frame.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    BgrImage::from_raw(width, height, buffer).ok_or_else(|| {
        LoadVideoError::Decode("Scaled frame has an unexpected buffer size".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(BgrImage::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(BgrImage::from_raw(2, 2, vec![0; 12]).is_some());
    }

    #[test]
    fn pixel_reads_bgr_order() {
        let image = BgrImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(image.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.shape(), (1, 2, 3));
    }

    #[test]
    fn rgb_conversion_swaps_channels() {
        let image = BgrImage::from_raw(1, 1, vec![10, 20, 30]).unwrap();
        let rgb = image.to_rgb_image().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [30, 20, 10]);
    }
}
