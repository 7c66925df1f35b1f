//! # Users Domain
//!
//! User accounts, permission groups, and authentication.
//!
//! - [`service`]: user CRUD and credential verification (argon2)
//! - [`policy`]: [`GroupPolicy`], the group-backed access policy
//! - [`directory`]: recipient resolution for admin notifications
//! - [`auth_handlers`]: login and current-user endpoints

pub mod auth_handlers;
pub mod directory;
pub mod error;
pub mod models;
pub mod policy;
pub mod postgres;
pub mod repository;
pub mod service;

pub use auth_handlers::{auth_router, AuthApiDoc};
pub use directory::UserDirectory;
pub use error::{UserError, UserResult};
pub use models::{CreateUser, Group, LoginRequest, LoginResponse, UpdateUser, User, UserResponse};
pub use policy::GroupPolicy;
pub use postgres::{PostgresGroupRepository, PostgresUserRepository};
pub use repository::{
    GroupRepository, InMemoryGroupRepository, InMemoryUserRepository, UserRepository,
};
pub use service::UserService;
