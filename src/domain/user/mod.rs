// src/domain/user/mod.rs
pub mod entity;
pub mod repository;
pub mod value_objects;

pub use entity::{NewUser, Role, User};
pub use repository::{RoleRepository, UserRepository};
pub use value_objects::{Email, PasswordHash, RoleId, RoleName, UserId, Username};
