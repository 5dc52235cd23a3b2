pub mod activity;
pub mod contributions;
pub mod cooperatives;
pub mod expenses;
pub mod health;
pub mod loans;
pub mod members;
pub mod reports;
pub mod roles;
