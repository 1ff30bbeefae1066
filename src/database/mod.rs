pub mod connection;
pub mod quizzes;
pub mod setup;
pub mod submissions;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
