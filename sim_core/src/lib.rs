//! Shared simulation services: the process-wide logging facade.
#![forbid(unsafe_code)]

pub mod logging;
