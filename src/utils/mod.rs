pub mod http;
pub mod logging;
pub mod redact;
pub mod text;
pub mod timing;
