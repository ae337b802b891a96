pub mod bbox;
pub mod recognize;
pub mod viewed;

pub use bbox::BBox;
pub use recognize::{recognize_shape, MemberSource, Recognized, ShapeParts};
pub use viewed::ViewedShape;
