pub mod customer_commands;
pub mod employee_commands;
pub mod role_commands;
pub mod station_commands;
pub mod utils;
