pub mod frame;
pub mod layer;
pub mod matrix;
pub mod outline;
pub mod params;

pub use frame::*;
pub use layer::*;
pub use matrix::*;
pub use outline::*;
pub use params::*;
