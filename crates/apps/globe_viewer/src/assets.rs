use image::imageops::FilterType;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode globe texture: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Dataset(#[from] formats::DatasetError),
}

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// 1x1 stand-in used until the real texture arrives.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![16, 40, 72, 255],
        }
    }
}

/// Decodes JPEG/PNG bytes; the format is sniffed from the content.
///
/// Images larger than `max_dimension` on either side are scaled down to fit,
/// keeping the aspect ratio.
pub fn decode_texture(bytes: &[u8], max_dimension: u32) -> Result<TextureImage, AssetError> {
    let mut decoded = image::load_from_memory(bytes)?;
    let max_dimension = max_dimension.max(1);
    if decoded.width() > max_dimension || decoded.height() > max_dimension {
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            max_dimension,
            "downscaling globe texture"
        );
        decoded = decoded.resize(max_dimension, max_dimension, FilterType::Triangle);
    }
    let image = decoded.to_rgba8();
    Ok(TextureImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
