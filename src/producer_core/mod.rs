//! Producer core - synthetic record generation and the live data file writer

pub mod generator;
pub mod writer;

pub use generator::RecordGenerator;
pub use writer::StreamWriter;
