use base64::{prelude::BASE64_STANDARD, Engine};
use image::{DynamicImage, ImageFormat, Rgb};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::application::composer::is_healthy_label;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
};

const LESION_COLOR: Rgb<u8> = Rgb([220, 38, 38]);
const HEALTHY_COLOR: Rgb<u8> = Rgb([22, 163, 74]);
const BOX_THICKNESS: i32 = 3;

/// Decodifica una subida; solo se aceptan JPEG y PNG.
pub fn decode_upload(bytes: &[u8]) -> DomainResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(DomainError::UnreadableImage("empty upload".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|_| DomainError::UnreadableImage("file is not a JPEG or PNG image".into()))?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(DomainError::UnreadableImage(format!(
            "unsupported image format {format:?}; upload a JPEG or PNG"
        )));
    }
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DomainError::UnreadableImage(format!("could not decode image: {e}")))
}

/// Dibuja las cajas sobre la imagen y la devuelve como data URI JPEG.
pub fn annotate_to_data_uri(bytes: &[u8], detections: &[Detection]) -> DomainResult<String> {
    let mut canvas = decode_upload(bytes)?.to_rgb8();
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);

    for det in detections {
        let color = if is_healthy_label(&det.label) { HEALTHY_COLOR } else { LESION_COLOR };
        let x = (det.x1 as i32).clamp(0, w - 1);
        let y = (det.y1 as i32).clamp(0, h - 1);
        let x2 = (det.x2 as i32).clamp(0, w - 1);
        let y2 = (det.y2 as i32).clamp(0, h - 1);
        for t in 0..BOX_THICKNESS {
            let bw = (x2 - x - 2 * t).max(1) as u32;
            let bh = (y2 - y - 2 * t).max(1) as u32;
            draw_hollow_rect_mut(&mut canvas, Rect::at(x + t, y + t).of_size(bw, bh), color);
        }
    }

    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 85);
    encoder
        .encode_image(&canvas)
        .map_err(|e| DomainError::OperationFailed(format!("preview encoding: {e}")))?;
    Ok(format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(buf)))
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, Rgb([200, 170, 150]));
    let mut out = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
