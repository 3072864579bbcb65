pub mod aabb2;
pub mod distances2;
pub mod polyline;
pub mod polyline_intersections;
pub mod resample;
