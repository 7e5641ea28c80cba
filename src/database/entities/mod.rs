pub mod sales;

pub use sales::Entity as Sales;

// Type aliases
pub type SaleRecord = sales::Model;
