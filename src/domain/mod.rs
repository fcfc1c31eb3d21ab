pub mod comment;
pub mod moderation;
