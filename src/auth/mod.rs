// 认证模块

pub mod constants;
pub mod oauth;
pub mod random;
pub mod types;

pub use random::{generate_random_number, generate_random_string};
pub use types::{Token, UserInfo};
