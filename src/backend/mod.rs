mod files;
mod http;

pub use files::LocalMediaFiles;
pub use http::BackendClient;
