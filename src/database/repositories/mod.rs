//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod product;
pub mod vote;
pub mod comment;
pub mod boost;

// Re-export repositories
pub use user::UserRepository;
pub use product::{ProductRepository, ProductFilter};
pub use vote::VoteRepository;
pub use comment::CommentRepository;
pub use boost::BoostRepository;
