pub mod moment;
pub mod pattern;
pub mod role;
pub mod settings;
pub mod sync;

pub use moment::*;
pub use pattern::*;
pub use role::*;
pub use settings::*;
pub use sync::*;
