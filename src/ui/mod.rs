pub mod admin;
pub mod catalog;
pub mod lookbooks;
pub mod toasts;
pub mod tryon;
pub mod wallet;
