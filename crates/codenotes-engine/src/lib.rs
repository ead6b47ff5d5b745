pub mod editing;
pub mod io;
pub mod models;
pub mod store;

// Re-export key types for easier usage
pub use editing::{ChangeSummary, ContentChange, DocumentText, split_pasted_range, translate_anchor};
pub use io::{IoError, load_annotations, save_annotations};
pub use models::{Anchor, AnchorId, Point, Range, range_contains, range_of};
pub use store::{AnnotationStore, StoreError};
