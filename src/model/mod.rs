pub mod comment;
pub mod notice;
pub mod user;
