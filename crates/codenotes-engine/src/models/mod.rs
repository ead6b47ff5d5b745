pub mod anchor;
pub mod range;

pub use anchor::{Anchor, AnchorId};
pub use range::{Point, Range, range_contains, range_of};
