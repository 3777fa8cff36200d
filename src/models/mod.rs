pub mod admin;
pub mod reseller;
pub mod product;
pub mod order;
pub mod withdrawal;
pub mod message;
