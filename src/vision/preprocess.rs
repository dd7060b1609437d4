use crate::{Result, config::TensorLayout};
use image::{ImageReader, RgbImage, imageops::FilterType};
use std::io::Cursor;
use tract_onnx::prelude::tract_ndarray::Array4;

/// Decodes an uploaded image into a single-item batch of RGB values in `[0, 1]`.
///
/// The encoding is sniffed from the bytes. The image is resized to exactly
/// `size × size` (aspect ratio is not preserved) with a bicubic filter.
pub fn preprocess(bytes: &[u8], size: u32, layout: TensorLayout) -> Result<Array4<f32>> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    let rgb = image
        .resize_exact(size, size, FilterType::CatmullRom)
        .to_rgb8();

    Ok(to_tensor(&rgb, layout))
}

fn to_tensor(rgb: &RgbImage, layout: TensorLayout) -> Array4<f32> {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let value = |x: usize, y: usize, c: usize| rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;

    match layout {
        TensorLayout::Nhwc => {
            Array4::from_shape_fn((1, height, width, 3), |(_, y, x, c)| value(x, y, c))
        }
        TensorLayout::Nchw => {
            Array4::from_shape_fn((1, 3, height, width), |(_, c, y, x)| value(x, y, c))
        }
    }
}
