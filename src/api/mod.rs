pub mod attendance;
pub mod auto_close;
pub mod payroll;
