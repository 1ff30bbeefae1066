pub mod leaderboard;
pub mod server;

pub use leaderboard::build_leaderboard;
pub use server::ServerService;
