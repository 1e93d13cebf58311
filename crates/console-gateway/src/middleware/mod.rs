//! HTTP middleware: admission gate and request logging.

pub mod gate;
pub mod logging;
