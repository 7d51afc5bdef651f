pub mod auth;
pub mod comments;
pub mod conversations;
mod convert;
pub mod error;
pub mod events;
pub mod follows;
pub mod messages;
pub mod middleware;
pub mod profile;
pub mod projects;
pub mod search;
