pub mod applications;
pub mod auth;
pub mod projects;
