use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::Luma;
use qrcode::QrCode;

use crate::error::{AppError, Result};

/// A rendered scannable code: PNG bytes for document embedding, and the same
/// image as a data URL for inline storage on the booking.
#[derive(Debug, Clone)]
pub struct ScannableCode {
    pub png: Vec<u8>,
    pub data_url: String,
}

/// Render `verify_url` as a QR code. Deterministic given the same URL.
pub fn generate(verify_url: &str) -> Result<ScannableCode> {
    let code = QrCode::new(verify_url.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encoding error: {}", e)))?;

    let img = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(8, 8)
        .build();

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("QR rasterization error: {}", e)))?;

    let data_url = format!("data:image/png;base64,{}", BASE64.encode(&png));

    Ok(ScannableCode { png, data_url })
}
