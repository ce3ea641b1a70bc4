pub mod accounts;
pub mod instructions;
