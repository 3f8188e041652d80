//! Channel-order conversion for detector input.

use crate::inference::ChannelOrder;
use image::{DynamicImage, RgbImage};

/// Convert a decoded image into 8-bit, 3-channel pixels in `order`.
///
/// Grayscale and alpha images are expanded/flattened to three channels
/// first. The returned buffer is typed as `RgbImage` for convenience, but
/// its channels are laid out in `order`.
pub fn to_channel_order(image: DynamicImage, order: ChannelOrder) -> RgbImage {
    let mut pixels = image.into_rgb8();
    if order == ChannelOrder::Bgr {
        for pixel in pixels.pixels_mut() {
            pixel.0.swap(0, 2);
        }
    }
    pixels
}
