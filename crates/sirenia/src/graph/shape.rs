use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Node boundary, centered on the node's center point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Shape {
    Rectangle { width: f64, height: f64 },
    Ellipse { width: f64, height: f64 },
}

impl Shape {
    pub fn rectangle(width: f64, height: f64) -> Self {
        Shape::Rectangle { width, height }
    }

    pub fn ellipse(width: f64, height: f64) -> Self {
        Shape::Ellipse { width, height }
    }

    pub fn width(&self) -> f64 {
        match *self {
            Shape::Rectangle { width, .. } | Shape::Ellipse { width, .. } => width,
        }
    }

    pub fn height(&self) -> f64 {
        match *self {
            Shape::Rectangle { height, .. } | Shape::Ellipse { height, .. } => height,
        }
    }

    pub fn bounding_box(&self, center: Point) -> Rect {
        Rect::from_center(center, self.width(), self.height())
    }

    /// Point where the ray from `center` toward `toward` leaves the boundary.
    ///
    /// When `toward` coincides with `center` the ray has no direction; the right-most boundary
    /// point is returned so callers always get a deterministic answer.
    pub fn intersect(&self, center: Point, toward: Point) -> Point {
        let dx = toward.x - center.x;
        let dy = toward.y - center.y;
        let w = self.width() / 2.0;
        let h = self.height() / 2.0;

        if dx == 0.0 && dy == 0.0 {
            return Point {
                x: center.x + w,
                y: center.y,
            };
        }

        match self {
            Shape::Rectangle { .. } => intersect_rect(center, dx, dy, w, h),
            Shape::Ellipse { .. } => intersect_ellipse(center, dx, dy, w, h),
        }
    }
}

fn intersect_rect(center: Point, dx: f64, dy: f64, mut w: f64, mut h: f64) -> Point {
    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        if dy < 0.0 {
            h = -h;
        }
        (h * dx / dy, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        (w, w * dy / dx)
    };

    Point {
        x: center.x + sx,
        y: center.y + sy,
    }
}

fn intersect_ellipse(center: Point, dx: f64, dy: f64, rx: f64, ry: f64) -> Point {
    if rx <= 0.0 || ry <= 0.0 {
        return center;
    }
    let t = 1.0 / ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt();
    Point {
        x: center.x + dx * t,
        y: center.y + dy * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn rectangle_clips_on_the_facing_side() {
        let s = Shape::rectangle(20.0, 10.0);
        let c = Point { x: 0.0, y: 0.0 };
        assert!(close(s.intersect(c, Point { x: 100.0, y: 0.0 }), Point { x: 10.0, y: 0.0 }));
        assert!(close(s.intersect(c, Point { x: 0.0, y: -100.0 }), Point { x: 0.0, y: -5.0 }));
        assert!(close(s.intersect(c, Point { x: -20.0, y: 10.0 }), Point { x: -10.0, y: 5.0 }));
    }

    #[test]
    fn ellipse_clips_on_its_boundary() {
        let s = Shape::ellipse(20.0, 10.0);
        let c = Point { x: 5.0, y: 5.0 };
        let p = s.intersect(c, Point { x: 5.0, y: 50.0 });
        assert!(close(p, Point { x: 5.0, y: 10.0 }));

        let q = s.intersect(c, Point { x: 30.0, y: 30.0 });
        let nx = (q.x - c.x) / 10.0;
        let ny = (q.y - c.y) / 5.0;
        assert!((nx * nx + ny * ny - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_target_falls_back_to_right_side() {
        let c = Point { x: 1.0, y: 2.0 };
        assert!(close(
            Shape::rectangle(4.0, 4.0).intersect(c, c),
            Point { x: 3.0, y: 2.0 }
        ));
        assert!(close(
            Shape::ellipse(4.0, 4.0).intersect(c, c),
            Point { x: 3.0, y: 2.0 }
        ));
    }
}
