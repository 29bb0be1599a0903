pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod monitor;
pub mod notify;
pub mod state;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
