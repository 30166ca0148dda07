mod export;
mod log_store;
mod logging;
mod snapshot;
mod state_dir;

pub use export::*;
pub use log_store::*;
pub use logging::*;
pub use snapshot::*;
pub use state_dir::*;
