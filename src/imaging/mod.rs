//! Image loading and preparation for detectors.

mod convert;
mod decode;

pub use convert::to_channel_order;
pub use decode::decode_image;

use crate::error::Result;
use crate::inference::{ChannelOrder, ImageFrame};
use std::path::Path;

/// Load `image_root/image_path_rel` and prepare it for a detector.
///
/// Decodes the file and converts it to `order`. The frame keeps the
/// manifest-relative path as its source.
pub fn load_frame(
    image_root: &Path,
    image_path_rel: &str,
    order: ChannelOrder,
) -> Result<ImageFrame> {
    let decoded = decode_image(&image_root.join(image_path_rel))?;
    Ok(ImageFrame {
        source: image_path_rel.to_string(),
        order,
        pixels: to_channel_order(decoded, order),
    })
}
