pub mod config;
pub mod logging;

pub mod client;
pub mod error;
pub mod fetch_head;
pub mod file_info;
pub mod relay;
pub mod request;
pub mod resolver;
pub mod url_model;

pub use error::RelayError;
pub use file_info::FileInfo;
