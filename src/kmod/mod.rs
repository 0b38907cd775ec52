// Re-export types from submodules
pub use self::fs::*;
pub use self::registry::*;

// Declare submodules
mod fs;
pub mod registry;
