pub mod sales;

pub use sales::{MAX_AMOUNT, NewSale, SalesDao, is_storable_amount};
