pub mod admin;
pub mod salary;
