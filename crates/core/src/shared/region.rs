/// A detected face bounding box in frame pixel coordinates.
///
/// Boxes are clamped to the frame by the detector that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f64,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32, score: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.area() as f64;
        let area_b = other.area() as f64;
        inter / (area_a + area_b - inter)
    }

    /// Drops degenerate boxes and those smaller than `min_side` pixels.
    pub fn retain_min_size(regions: Vec<Region>, min_side: i32) -> Vec<Region> {
        regions
            .into_iter()
            .filter(|r| r.width >= min_side.max(1) && r.height >= min_side.max(1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::new(x, y, w, h, 0.9)
    }

    #[test]
    fn test_iou_identical_regions() {
        let a = region(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection 50*100, union 10000 + 10000 - 5000
        let a = region(0, 0, 100, 100);
        let b = region(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[rstest]
    #[case(region(0, 0, 50, 50), region(100, 100, 50, 50))]
    #[case(region(0, 0, 50, 50), region(50, 0, 50, 50))]
    fn test_iou_disjoint_or_touching_is_zero(#[case] a: Region, #[case] b: Region) {
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_area_of_degenerate_box_is_zero() {
        assert_eq!(region(0, 0, -5, 10).area(), 0);
        assert_eq!(region(0, 0, 4, 5).area(), 20);
    }

    #[test]
    fn test_retain_min_size_filters_small_and_empty_boxes() {
        let kept = Region::retain_min_size(
            vec![region(0, 0, 0, 10), region(0, 0, 8, 8), region(0, 0, 30, 40)],
            10,
        );
        assert_eq!(kept, vec![region(0, 0, 30, 40)]);
    }
}
