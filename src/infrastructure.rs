pub mod db;
pub mod github;
pub mod limiter;
pub mod mail;
pub mod storage;
pub mod utils;
