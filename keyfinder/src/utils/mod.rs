//! Supporting infrastructure shared by the pipeline and the analysis code.

pub mod errors;
