pub mod bounds;
pub mod geometry;
pub mod ids;
pub mod math;
pub mod scale;
pub mod time;
pub mod view;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use geometry::*;
pub use ids::*;
pub use scale::*;
pub use time::*;
pub use view::*;
