//! Region geometry helpers shared by the front end and replay tooling.

use crate::source::Region;

/// Expand a region to a square around its centre, kept inside the frame
///
/// The side is the larger of width and height. A square larger than the
/// frame is pinned to the top-left corner.
#[must_use]
pub fn square_region(region: Region, frame_width: i32, frame_height: i32) -> Region {
    let side = region.width.max(region.height);
    let center_x = region.x + region.width / 2;
    let center_y = region.y + region.height / 2;

    let mut x = (center_x - side / 2).max(0);
    let mut y = (center_y - side / 2).max(0);

    if x + side > frame_width {
        x = (frame_width - side).max(0);
    }
    if y + side > frame_height {
        y = (frame_height - side).max(0);
    }

    Region::new(x, y, side, side)
}

/// Extent reported for a detected region
///
/// With `square` the region is first squared so that aspect-ratio jitter of
/// the bounding box does not show up as a size change.
#[must_use]
pub fn region_extent(region: Region, square: bool) -> f64 {
    if square {
        let side = f64::from(region.width.max(region.height));
        side * side
    } else {
        region.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_region_centered() {
        let squared = square_region(Region::new(100, 100, 40, 20), 640, 480);
        assert_eq!(squared.width, squared.height);
        assert_eq!(squared.width, 40);
        // Centre (120, 110) is preserved
        assert_eq!(squared.x, 100);
        assert_eq!(squared.y, 90);
    }

    #[test]
    fn test_square_region_clamped() {
        let squared = square_region(Region::new(0, 0, 10, 60), 640, 480);
        assert_eq!(squared.x, 0);
        assert_eq!(squared.y, 0);

        let squared = square_region(Region::new(620, 460, 40, 20), 640, 480);
        assert_eq!(squared.x + squared.width, 640);
        assert!(squared.y + squared.height <= 480);
    }

    #[test]
    fn test_square_larger_than_frame() {
        let squared = square_region(Region::new(0, 0, 700, 10), 640, 480);
        assert_eq!(squared.x, 0);
        assert_eq!(squared.y, 0);
        assert_eq!(squared.width, 700);
    }

    #[test]
    fn test_region_extent() {
        let region = Region::new(0, 0, 30, 50);
        assert_eq!(region_extent(region, false), 1500.0);
        assert_eq!(region_extent(region, true), 2500.0);
    }
}
