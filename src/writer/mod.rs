pub mod generator;
pub mod template;

pub use generator::*;
pub use template::*;
