//! Cardano transaction export module
//! Re-shapes decoded transactions to an era's collection encoding rules and serialises them

pub mod envelope;
pub mod exporter;
pub mod normalizer;
pub mod resolver;
pub mod session;

pub use envelope::TextEnvelope;
pub use exporter::{ExportError, ExportFormat, ExportedArtifact, export};
pub use normalizer::{NormalizeError, Normalizer, normalize};
pub use resolver::{Cardinality, resolve};
pub use session::{ExportSession, LoadedTransaction};
