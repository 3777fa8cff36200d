pub mod auth;
pub mod product;
pub mod order;
pub mod withdrawal;
pub mod message;
pub mod affiliate;
pub mod dashboard;
pub mod transaction;
pub mod reseller;
