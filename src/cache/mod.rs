pub mod fingerprint;
mod structs;

pub use fingerprint::Fingerprint;
pub use structs::Cache;
