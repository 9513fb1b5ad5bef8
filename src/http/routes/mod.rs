pub mod pages;
pub mod tasks;
