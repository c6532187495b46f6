mod certs;
mod error;
mod tx;
mod utils;
mod witness;

pub use error::*;
pub use tx::*;
