use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Returns `None` for vectors too short to carry a direction.
    pub fn normalized(self) -> Option<Vec2> {
        let length = self.length();
        if !length.is_finite() || length <= f32::EPSILON {
            return None;
        }
        Some(Vec2 {
            x: self.x / length,
            y: self.y / length,
        })
    }

    pub fn rounded_px(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned pixel rectangle in frame-buffer space (y grows downward).
///
/// Edge accessors follow the usual sprite convention: `right()` and `bottom()`
/// are one past the last covered pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: (i32, i32), width: i32, height: i32) -> Self {
        Self::new(center.0 - width / 2, center.1 - height / 2, width, height)
    }

    pub fn from_mid_bottom(mid_bottom: (i32, i32), width: i32, height: i32) -> Self {
        Self::new(mid_bottom.0 - width / 2, mid_bottom.1 - height, width, height)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn center_vec(&self) -> Vec2 {
        let (x, y) = self.center();
        Vec2::new(x as f32, y as f32)
    }

    pub fn mid_top(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y)
    }

    pub fn mid_bottom(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.bottom())
    }

    pub fn bottom_left(&self) -> (i32, i32) {
        (self.x, self.bottom())
    }

    pub fn bottom_right(&self) -> (i32, i32) {
        (self.right(), self.bottom())
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows the rectangle by `dx`/`dy` in total, keeping the center fixed.
    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x - dx / 2,
            self.y - dy / 2,
            self.width + dx,
            self.height + dy,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, point: (i32, i32)) -> bool {
        point.0 >= self.x && point.0 < self.right() && point.1 >= self.y && point.1 < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_bottom_constructor_places_feet_on_point() {
        let rect = Rect::from_mid_bottom((100, 200), 40, 60);
        assert_eq!(rect.mid_bottom(), (100, 200));
        assert_eq!(rect.top(), 140);
        assert_eq!(rect.bottom_left(), (80, 200));
        assert_eq!(rect.bottom_right(), (120, 200));
    }

    #[test]
    fn inflate_keeps_center() {
        let rect = Rect::new(10, 10, 20, 20);
        let grown = rect.inflate(30, 30);
        assert_eq!(grown, Rect::new(-5, -5, 50, 50));
        assert_eq!(grown.center(), rect.center());
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translated(-1, 0)));
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Rect::new(2, 2, 0, 5)));
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert_eq!(Vec2::ZERO.normalized(), None);
        let dir = Vec2::new(3.0, 4.0).normalized().expect("direction");
        assert!((dir.x - 0.6).abs() < 1e-6);
        assert!((dir.y - 0.8).abs() < 1e-6);
    }
}
