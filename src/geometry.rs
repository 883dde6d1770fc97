//! Axis-aligned rectangles in page coordinates.
//!
//! Rectangles are half-open in spirit: two rectangles that only share an
//! edge do not intersect. This is what lets the pieces of a difference sit
//! flush against the rectangle that was cut out of them.

/// An axis-aligned rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its left, top, right and bottom edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// A rectangle without positive area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Smallest rectangle enclosing every rectangle of the iterator.
    pub fn bounding<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(acc) => Some(acc.union(r)),
                None => Some(*r),
            })
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn padded(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// `self` minus `other`, as up to four non-overlapping rectangles.
    ///
    /// The pieces are a full-width band above the cut, a full-width band
    /// below it, and the left and right remainders between those bands.
    /// Empty pieces are omitted. Without an intersection the result is
    /// `self` unchanged.
    pub fn difference(&self, other: &Rect) -> Vec<Rect> {
        let Some(cut) = self.intersection(other) else {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        };

        let pieces = [
            Rect::from_edges(self.x, self.y, self.right(), cut.y),
            Rect::from_edges(self.x, cut.bottom(), self.right(), self.bottom()),
            Rect::from_edges(self.x, cut.y, cut.x, cut.bottom()),
            Rect::from_edges(cut.right(), cut.y, self.right(), cut.bottom()),
        ];

        pieces.into_iter().filter(|r| !r.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(5.0, 5.0, 0.0, 3.0)));
    }

    #[test]
    fn test_difference_hole() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 20.0, 20.0);
        let pieces = outer.difference(&inner);

        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces[0], Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(pieces[1], Rect::new(0.0, 60.0, 100.0, 40.0));
        assert_eq!(pieces[2], Rect::new(0.0, 40.0, 40.0, 20.0));
        assert_eq!(pieces[3], Rect::new(60.0, 40.0, 40.0, 20.0));
    }

    #[test]
    fn test_difference_covering_cut_removes_everything() {
        let small = Rect::new(10.0, 10.0, 5.0, 5.0);
        let big = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(small.difference(&big).is_empty());
    }

    #[test]
    fn test_difference_disjoint_is_identity() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert_eq!(a.difference(&b), vec![a]);
    }

    #[test]
    fn test_bounding_and_padding() {
        let rects = [Rect::new(10.0, 10.0, 5.0, 5.0), Rect::new(0.0, 20.0, 3.0, 1.0)];
        let bbox = Rect::bounding(&rects).unwrap();
        assert_eq!(bbox, Rect::from_edges(0.0, 10.0, 15.0, 21.0));
        assert_eq!(bbox.padded(1.0), Rect::from_edges(-1.0, 9.0, 16.0, 22.0));
        assert_eq!(Rect::bounding(std::iter::empty()), None);
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (0i32..200, 0i32..200, 1i32..120, 1i32..120)
            .prop_map(|(x, y, w, h)| Rect::new(x as f64, y as f64, w as f64, h as f64))
    }

    proptest! {
        #[test]
        fn prop_difference_pieces_are_disjoint_and_inside(a in rect_strategy(), b in rect_strategy()) {
            let pieces = a.difference(&b);
            let overlap = a.intersection(&b).map(|r| r.area()).unwrap_or(0.0);
            let total: f64 = pieces.iter().map(Rect::area).sum();

            prop_assert!((total - (a.area() - overlap)).abs() < 1e-6);
            for (i, p) in pieces.iter().enumerate() {
                prop_assert!(!p.intersects(&b));
                prop_assert!(p.x >= a.x && p.y >= a.y);
                prop_assert!(p.right() <= a.right() && p.bottom() <= a.bottom());
                for q in &pieces[i + 1..] {
                    prop_assert!(!p.intersects(q));
                }
            }
        }
    }
}
