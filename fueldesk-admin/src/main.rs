// fueldesk-admin/src/main.rs
//
// Operator CLI for the fueldesk database. Works directly against the
// database through fueldesk-api's ORM layer; useful for bootstrap and
// break-glass maintenance when the web API is unavailable.

use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::customer_commands::{CustomerAction, handle_customer_command};
use admin_cli::employee_commands::{EmployeeAction, handle_employee_command};
use admin_cli::role_commands::{RoleAction, handle_role_command};
use admin_cli::station_commands::{StationAction, handle_station_command};

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "fueldesk-admin")]
#[command(about = "Fueldesk database administration tool")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage employees")]
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    #[command(about = "Manage customers")]
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    #[command(about = "Manage filling stations")]
    Station {
        #[command(subcommand)]
        action: StationAction,
    },
    #[command(about = "Manage roles")]
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.version_info {
        println!("fueldesk-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return;
    }

    let result = match cli.command {
        Some(Commands::Employee { action }) => handle_employee_command(action),
        Some(Commands::Customer { action }) => handle_customer_command(action),
        Some(Commands::Station { action }) => handle_station_command(action),
        Some(Commands::Role { action }) => handle_role_command(action),
        None => {
            eprintln!("No command given; see --help");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
