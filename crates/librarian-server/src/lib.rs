//! Librarian Server
//!
//! Exposes the index through tool requests over newline-delimited JSON.

mod error;
mod handler;
pub mod protocol;
mod server;

pub use error::ServerError;
pub use handler::ToolHandler;
pub use protocol::{ErrorKind, FileMatch, Request, Response, ResponseData};
pub use server::{JsonLineServer, RequestHandler};
