//! Library side of the `qmap` command: sample shapes, JSON input, logging.

pub mod json;
pub mod logging;
pub mod samples;
