pub mod actions;
pub mod packing;
pub mod plan;
pub mod smart_account;
