pub mod account;
pub mod task;
pub mod view;
