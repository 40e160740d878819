pub mod config;
pub mod events;

pub use config::*;
pub use events::*;
