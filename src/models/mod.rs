pub mod account_token;
pub mod user;
