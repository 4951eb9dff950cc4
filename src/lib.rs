pub mod config;
pub mod error;
pub mod locations;
pub mod manager;
pub mod middleware;
pub mod server;
pub mod storage;

pub use manager::FileManager;
pub use server::Server;
