pub mod handlers;
pub mod models;
pub mod ocr_client;
pub mod routes;

pub use ocr_client::OcrClient;
pub use routes::create_router;
