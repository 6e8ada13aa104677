pub mod cover;
pub mod remote;
pub mod todo;
