// Transaction sanitizer common library - main library exports

pub mod certificate;
pub mod collection;
pub mod hash;
pub mod tx;
pub mod types;

// Flattened re-exports
pub use self::certificate::*;
pub use self::collection::*;
pub use self::hash::*;
pub use self::tx::*;
pub use self::types::*;
