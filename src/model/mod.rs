pub mod attendance;
pub mod department;
pub mod holiday;
pub mod leave;
pub mod notification;
pub mod payslip;
pub mod project;
pub mod role;
pub mod time_entry;
pub mod user;
