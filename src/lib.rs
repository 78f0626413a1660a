#![forbid(unsafe_code)]

pub mod cli;
pub mod formats;
pub mod logging;
pub mod outline;
pub mod render;
pub mod response_file;
pub mod sanitize;
pub mod script;
pub mod service;
pub mod toc;
