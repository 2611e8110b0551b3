pub mod application;
pub mod project;
pub mod user;
