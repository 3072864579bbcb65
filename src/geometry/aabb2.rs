use ncollide2d::bounding_volume::{BoundingVolume, AABB};
use ncollide2d::na::{Point2, RealField};
use ncollide2d::partitioning::{VisitStatus, Visitor};

/// Returns the axis aligned bounding box of the segment between two points
pub fn segment_aabb<N: RealField + Copy>(a: &Point2<N>, b: &Point2<N>) -> AABB<N> {
    AABB::new(
        Point2::new(a.x.min(b.x), a.y.min(b.y)),
        Point2::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// A visitor which traverses a BVH collecting every leaf whose bounding volume overlaps a query
/// box. Touching boxes count as overlapping, so the caller still has to run an exact test on the
/// collected items.
pub struct OverlapVisitor<'a, N: 'a + RealField + Copy, T: 'a> {
    pub query: &'a AABB<N>,
    pub collector: &'a mut Vec<T>,
}

impl<'a, N: RealField + Copy, T: Clone> OverlapVisitor<'a, N, T> {
    pub fn new(query: &'a AABB<N>, buffer: &'a mut Vec<T>) -> OverlapVisitor<'a, N, T> {
        OverlapVisitor {
            query,
            collector: buffer,
        }
    }
}

impl<'a, N, T> Visitor<T, AABB<N>> for OverlapVisitor<'a, N, T>
where
    N: RealField + Copy,
    T: Clone,
{
    fn visit(&mut self, bv: &AABB<N>, t: Option<&T>) -> VisitStatus {
        if bv.intersects(self.query) {
            if let Some(t) = t {
                self.collector.push(t.clone());
            }

            VisitStatus::Continue
        } else {
            VisitStatus::Stop
        }
    }
}
