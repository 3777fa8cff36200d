pub mod auth;
pub mod product;
pub mod order;
pub mod withdrawal;
pub mod message;
pub mod settings;
pub mod dashboard;
pub mod affiliate;
pub mod reseller;
pub mod transaction;
pub mod events;
