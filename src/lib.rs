pub mod catalog;
pub mod clause;
pub mod cli;
pub mod config;
pub mod error;
pub mod helpers;
pub mod infer;
pub mod inflect;
pub mod writer;

pub use catalog::{load_catalog, Catalog};
pub use cli::Cli;
pub use config::{load_config, Config, SqlTarget};
pub use error::{Error, Result};
pub use helpers::Helpers;
pub use writer::{Generator, QueryTemplate, RenderContext, Template};
