use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use lambda_runtime::tracing;
use tokio::sync::oneshot;

use crate::error::ResizeError;

pub const TARGET_WIDTH: u32 = 256;
pub const TARGET_HEIGHT: u32 = 256;

/// Bicubic resampling, pinned so identical sources give identical output bytes.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

pub const JPEG_QUALITY: u8 = 75;

/// Decode `data` (format is sniffed) and scale it to exactly
/// `TARGET_WIDTH`x`TARGET_HEIGHT`, ignoring the source aspect ratio.
pub fn decode_and_resize(data: &[u8]) -> Result<DynamicImage, ResizeError> {
    let img = image::load_from_memory(data).map_err(ResizeError::Decode)?;

    let (width, height) = img.dimensions();
    tracing::debug!(width, height, "decoded source image");

    Ok(img.resize_exact(TARGET_WIDTH, TARGET_HEIGHT, RESIZE_FILTER))
}

/// Encode as baseline JPEG. Alpha and high bit depths are dropped by
/// converting to 8-bit RGB first, so colour modes JPEG cannot carry (RGBA,
/// LA, 16-bit) are flattened rather than rejected. `ResizeError::Encode` is
/// left for failures inside the encoder itself.
pub fn encode(img: &DynamicImage) -> Result<Bytes, ResizeError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buff = Cursor::new(Vec::new());
    rgb.write_to(&mut buff, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(ResizeError::Encode)?;
    Ok(Bytes::from(buff.into_inner()))
}

// Run `job` on the rayon pool sized at cold start and wait for its result.
// A panicking job is caught here; rayon would otherwise abort the process.
pub async fn run_on_pool<T, F>(job: F) -> Result<T, ResizeError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ResizeError> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    rayon::spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
            tracing::error!("image worker panicked");
            Err(ResizeError::Transform)
        });
        // The receiver only goes away if the invocation itself was dropped.
        let _ = tx.send(result);
    });

    rx.await.map_err(|_| ResizeError::Transform)?
}

// Decoding and encoding are CPU bound, so they stay off the async runtime.
pub async fn resize_to_jpeg(data: Bytes) -> Result<Bytes, ResizeError> {
    run_on_pool(move || decode_and_resize(&data).and_then(|img| encode(&img))).await
}

#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));

    let mut buff = Cursor::new(Vec::new());
    img.write_to(&mut buff, ImageOutputFormat::Png).unwrap();
    buff.into_inner()
}
