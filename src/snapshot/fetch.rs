//! Snapshot download and JPEG decode

use super::auth::SessionCredential;
use super::client::{check_status, with_session, NestClient};
use super::{Result, SnapshotError};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

/// Snapshot endpoint on the per-camera service host.
pub const IMAGE_ENDPOINT: &str = "/get_image";

/// Raster decoded from the snapshot payload.
pub type DecodedImage = DynamicImage;

impl NestClient {
    /// Fetch one frame from a camera's service host.
    ///
    /// `width` is a hint; the server keeps the aspect ratio and may not match
    /// it exactly.
    pub async fn fetch_image(
        &self,
        session: &SessionCredential,
        service_host: &str,
        camera_uuid: &str,
        width: u32,
    ) -> Result<DecodedImage> {
        info!("getting image from camera");

        let mut url = self.service_url(service_host, IMAGE_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("uuid", camera_uuid)
            .append_pair("width", &width.to_string());
        debug!(url = %url, "making GET request");

        let response = with_session(self.http().get(url), session)?.send().await?;
        let response = check_status(response)?;
        let payload = response.bytes().await?;

        debug!(bytes = payload.len(), "decoding image response from server");
        let image = decode_jpeg(&payload)?;
        info!(
            width = image.width(),
            height = image.height(),
            "received image from camera"
        );
        Ok(image)
    }
}

/// Decode a snapshot payload; anything but a valid JPEG is rejected.
pub fn decode_jpeg(payload: &[u8]) -> Result<DecodedImage> {
    image::load_from_memory_with_format(payload, ImageFormat::Jpeg).map_err(SnapshotError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ErrorKind;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_jpeg() {
        let image = decode_jpeg(&jpeg_bytes(64, 36)).unwrap();
        assert_eq!((image.width(), image.height()), (64, 36));
    }

    #[test]
    fn test_decode_rejects_html() {
        let err = decode_jpeg(b"<html><body>Login required</body></html>").unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("unexpected payload format"));
    }

    #[test]
    fn test_decode_rejects_png() {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([1, 2, 3])))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        assert!(decode_jpeg(&png).is_err());
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(decode_jpeg(&[]).is_err());
    }
}
