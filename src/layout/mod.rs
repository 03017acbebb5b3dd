pub mod wall;

pub use wall::*;
