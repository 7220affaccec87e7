// Re-export all models from their respective modules
pub mod package;
pub mod rate_limit;
pub mod relation;
pub mod user;

// Re-export commonly used models
pub use package::*;
pub use rate_limit::*;
pub use relation::*;
pub use user::*;
