pub mod contact;
pub mod github;
pub mod home;
pub mod projects;
pub mod resume;
pub mod system;
pub mod uploads;
