//! Border trimming: crop a rendered page to its content bounding box.
//!
//! The background reference is a fixed colour from [`TrimSettings`], never a
//! colour sampled from the image. After a crop every edge row and column holds
//! at least one content pixel, so trimming a trimmed image returns it as is.

use crate::config::TrimSettings;
use image::{DynamicImage, GenericImageView, Rgba};

/// Inclusive-exclusive pixel box: `x..x+width`, `y..y+height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tight box around every non-background pixel, or `None` for a blank image.
pub fn content_bbox(img: &DynamicImage, settings: &TrimSettings) -> Option<BoundingBox> {
    let (width, height) = img.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, px) in img.pixels() {
        if is_background(px, settings) {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    if !found || width == 0 || height == 0 {
        return None;
    }

    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop `img` to its content box; blank images come back unchanged.
pub fn trim_image(img: DynamicImage, settings: &TrimSettings) -> DynamicImage {
    match content_bbox(&img, settings) {
        Some(b) if (b.width, b.height) != img.dimensions() => {
            img.crop_imm(b.x, b.y, b.width, b.height)
        }
        _ => img,
    }
}

fn is_background(px: Rgba<u8>, settings: &TrimSettings) -> bool {
    let Rgba([r, g, b, a]) = px;
    if a == 0 {
        return true;
    }
    let tol = settings.tolerance;
    [r, g, b]
        .iter()
        .zip(settings.background.iter())
        .all(|(c, bg)| c.abs_diff(*bg) <= tol)
}
