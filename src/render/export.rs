use crate::foundation::error::{SceneError, SceneResult};
use std::io::Cursor;

/// Convert premultiplied RGBA8 to straight alpha in place.
pub fn unpremultiply_in_place(rgba8: &mut [u8]) {
    for px in rgba8.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Encode a premultiplied RGBA8 buffer as PNG.
pub fn encode_png(rgba8_premul: &[u8], width: u32, height: u32) -> SceneResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if rgba8_premul.len() != expected {
        return Err(SceneError::export(format!(
            "pixel buffer has {} bytes, expected {expected} for {width}x{height}",
            rgba8_premul.len()
        )));
    }
    let mut straight = rgba8_premul.to_vec();
    unpremultiply_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(width, height, straight)
        .ok_or_else(|| SceneError::export("pixel buffer does not match image size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| SceneError::export(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// Device-pixel size of a `width × height` CSS-pixel surface at `ratio`.
///
/// Fails when the ratio is not a positive finite number or the result is empty or larger
/// than `u16::MAX` in either direction.
pub fn device_size(width: u32, height: u32, ratio: f64) -> SceneResult<(u16, u16)> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(SceneError::surface(format!("invalid pixel ratio {ratio}")));
    }
    let scale = |v: u32, axis: &str| -> SceneResult<u16> {
        let px = (f64::from(v) * ratio).round();
        if px < 1.0 || px > f64::from(u16::MAX) {
            return Err(SceneError::surface(format!(
                "surface {axis} of {px} device pixels is out of range"
            )));
        }
        Ok(px as u16)
    };
    Ok((scale(width, "width")?, scale(height, "height")?))
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
