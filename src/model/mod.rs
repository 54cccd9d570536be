// Re-export all model types from submodules.

pub use image::{ImageKey, ImageRecord, ImageStatus};
pub use tree::{Forest, LineageTree, Slot, StatusTotals, TreeId};

mod image;
mod tree;
