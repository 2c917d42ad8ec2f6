//! User module.

mod models;
mod repository;

pub use models::User;
pub use repository::UserRepository;
