pub mod confirmation;
pub mod console;
pub mod controller;
pub mod levels;
pub mod metrics;
pub mod provider;
pub mod safety;
pub mod state;
pub mod system;
pub mod types;
pub mod view;

pub use types::*;
pub use controller::*;
