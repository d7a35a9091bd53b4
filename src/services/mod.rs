pub mod transport;

pub use transport::{ApiRequest, ApiResponse, HttpTransport};
