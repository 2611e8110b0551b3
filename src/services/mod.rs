pub mod application_service;
pub mod project_service;
pub mod user_service;

pub use application_service::{ApplicationError, ApplicationService};
pub use project_service::{ProjectError, ProjectService};
pub use user_service::{UserError, UserService};
