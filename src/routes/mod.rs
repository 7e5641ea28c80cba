pub mod health;
pub mod response;
pub mod root;
pub mod sales;

pub use health::create_health_routes;
pub use response::ApiResponse;
pub use root::{api_info, not_found};
pub use sales::create_sales_routes;
