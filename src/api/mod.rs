pub mod response;

pub use response::{OkResponse, TokenResponse};
