pub mod contact;
pub mod github;
pub mod projects;
pub mod resume;
