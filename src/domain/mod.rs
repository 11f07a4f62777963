pub mod reminder;
pub mod timeline;
pub mod window;
