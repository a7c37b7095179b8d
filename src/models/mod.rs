pub mod driver;
pub mod role;
pub mod status;
pub mod user;
