//! Persistent key-value storage (the client's "local storage").

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppError;

/// Storage key names as constants.
pub mod keys {
    /// The whole session, as one JSON record.
    pub const SESSION: &str = "executive_session";

    /// Four-key layout written by older dashboard builds.
    pub mod legacy {
        pub const TOKEN: &str = "auth_token";
        pub const USER: &str = "user_data";
        pub const CLIENT: &str = "client_data";
        pub const CREDENTIALS: &str = "client_credentials";

        pub const ALL: [&str; 4] = [TOKEN, USER, CLIENT, CREDENTIALS];
    }
}

/// String-keyed storage scoped to one client installation.
///
/// Each call is atomic on its own; there are no multi-key transactions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}
