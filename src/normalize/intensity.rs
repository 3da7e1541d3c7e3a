/// Intensity stretch for grayscale images
///
/// Linearly remaps pixel values so the darkest pixel becomes 0 and the
/// brightest becomes 255:
///
/// `out = round((in - min) / (max - min + EPSILON) * 255)`
///
/// A uniform image has `max == min`, so every pixel maps to 0.

use image::GrayImage;

/// Guards the division for zero-range (uniform) images
pub const EPSILON: f64 = 1e-8;

/// Minimum and maximum pixel value, or None for an empty image
pub fn intensity_range(img: &GrayImage) -> Option<(u8, u8)> {
    let mut pixels = img.as_raw().iter().copied();
    let first = pixels.next()?;
    Some(pixels.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Stretch the image in place to fill [0, 255]
pub fn stretch_intensity(img: &mut GrayImage) {
    let Some((min, max)) = intensity_range(img) else {
        return;
    };

    let scale = 255.0 / (f64::from(max - min) + EPSILON);
    let lut: Vec<u8> = (0..=255u8)
        .map(|v| {
            if v < min {
                return 0;
            }
            (f64::from(v - min) * scale).round().clamp(0.0, 255.0) as u8
        })
        .collect();

    for pixel in img.iter_mut() {
        *pixel = lut[*pixel as usize];
    }
}
