pub mod guard;
pub mod race;
pub mod states;

pub use guard::*;
pub use race::*;
pub use states::*;
