pub mod ping;
pub mod submit_email;

pub use ping::ping;
pub use submit_email::{method_not_allowed, submit_email};
