pub mod github;
pub mod message;
pub mod project;
pub mod resume;
