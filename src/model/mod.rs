pub mod attendance;
pub mod business;
pub mod employee;
pub mod payment;
pub mod role;
