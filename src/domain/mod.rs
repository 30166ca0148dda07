mod clock;
mod format;
mod tracker;
mod types;

pub use clock::*;
pub use format::*;
pub use tracker::*;
pub use types::*;
