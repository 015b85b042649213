pub mod busy;
pub mod debounce;
pub mod event_bus;
pub mod sequence;

pub use busy::*;
pub use debounce::*;
pub use event_bus::*;
pub use sequence::*;
