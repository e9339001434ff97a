pub mod chat;
pub mod community;
pub mod enums;
pub mod kid;
pub mod record;
pub mod user;
