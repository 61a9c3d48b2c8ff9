pub mod user;
pub mod whop;
