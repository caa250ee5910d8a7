//! PNG/JPEG source decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;
use log::debug;

use super::{Orientation, SourceImage};
use crate::error::DecodeError;

/// Decode PNG or JPEG bytes into an RGBA source image.
///
/// EXIF orientation is applied so the result has the same natural size a
/// browser reports for the image.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be detected.
/// Returns `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_source(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let orientation = get_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = orientation.apply(img);
    let source = SourceImage::from_rgba_image(oriented.into_rgba8());
    debug!(
        "decoded source {}x{} ({:?})",
        source.width, source.height, orientation
    );
    Ok(source)
}

/// Read the EXIF orientation tag.
///
/// Returns [`Orientation::UPRIGHT`] when there is no EXIF data or no tag.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from_exif)
            .unwrap_or_default(),
        Err(_) => Orientation::UPRIGHT,
    }
}
