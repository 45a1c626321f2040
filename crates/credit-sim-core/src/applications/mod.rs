pub mod contact;
pub mod intake;
pub mod store;
pub mod submit;
