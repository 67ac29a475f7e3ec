use super::assets::Bitmap;

const OPAQUE_ALPHA_THRESHOLD: u8 = 127;

/// One bit per pixel. Used both for pixel-perfect hit tests and for level walkability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BitMask {
    /// Pixels with alpha above 127 are set.
    pub fn from_alpha(bitmap: &Bitmap) -> Self {
        Self::from_fn(bitmap.width(), bitmap.height(), |x, y| {
            bitmap
                .pixel(x, y)
                .is_some_and(|rgba| rgba[3] > OPAQUE_ALPHA_THRESHOLD)
        })
    }

    pub fn from_fn(width: u32, height: u32, mut is_set: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(is_set(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Out-of-range coordinates read as unset.
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    /// True when some set pixel of `self` coincides with a set pixel of `other`,
    /// where `offset` is `other`'s top-left relative to `self`'s top-left.
    pub fn overlaps(&self, other: &BitMask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        let x_start = dx.max(0);
        let y_start = dy.max(0);
        let x_end = (self.width as i32).min(dx + other.width as i32);
        let y_end = (self.height as i32).min(dy + other.height as i32);
        if x_start >= x_end || y_start >= y_end {
            return false;
        }

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - dx, y - dy) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: u32, inset: u32) -> BitMask {
        BitMask::from_fn(size, size, |x, y| {
            x >= inset && y >= inset && x < size - inset && y < size - inset
        })
    }

    #[test]
    fn alpha_threshold_is_strictly_above_127() {
        let mut rgba = vec![0u8; 3 * 4];
        rgba[3] = 127;
        rgba[7] = 128;
        rgba[11] = 255;
        let bitmap = Bitmap::from_rgba(3, 1, rgba).expect("bitmap");
        let mask = BitMask::from_alpha(&bitmap);

        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn out_of_bounds_reads_are_unset() {
        let mask = BitMask::filled(4, 4);
        assert!(mask.get(0, 0));
        assert!(mask.get(3, 3));
        assert!(!mask.get(-1, 0));
        assert!(!mask.get(4, 0));
        assert!(!mask.get(0, 4));
        assert!(!mask.get(i32::MIN, i32::MAX));
    }

    #[test]
    fn overlap_ignores_transparent_corners() {
        // 10x10 masks with a 3px transparent border: boxes overlap but opaque cores do not.
        let a = square_mask(10, 3);
        let b = square_mask(10, 3);
        assert!(!a.overlaps(&b, (5, 5)));
        assert!(a.overlaps(&b, (3, 3)));
        assert!(a.overlaps(&b, (-3, 0)));
    }

    #[test]
    fn disjoint_offsets_never_overlap() {
        let a = BitMask::filled(4, 4);
        let b = BitMask::filled(4, 4);
        assert!(!a.overlaps(&b, (4, 0)));
        assert!(!a.overlaps(&b, (0, -4)));
        assert!(a.overlaps(&b, (3, 3)));
    }
}
