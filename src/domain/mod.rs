pub mod embedding;
pub mod error;
pub mod instrumentation;
pub mod specifier;
