//! Line-oriented transport over stdin/stdout

mod server;

pub use server::StdioServer;
