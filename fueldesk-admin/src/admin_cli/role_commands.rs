use clap::Subcommand;

use fueldesk_api::models::NewRole;
use fueldesk_api::orm::role::{insert_role, list_all_roles};

use super::utils::establish_connection;

#[derive(Subcommand)]
pub enum RoleAction {
    #[command(about = "Add a new role")]
    Add {
        #[arg(short, long, help = "Role name")]
        name: String,
        #[arg(short, long, help = "Description")]
        description: Option<String>,
    },
    #[command(about = "List roles")]
    Ls,
}

pub fn handle_role_command(action: RoleAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;

    match action {
        RoleAction::Add { name, description } => {
            let role = insert_role(&mut conn, NewRole { name, description })?;
            println!("Created role '{}' (ID: {})", role.name, role.id);
        }
        RoleAction::Ls => {
            for role in list_all_roles(&mut conn)? {
                println!(
                    "{}\t{}\t{}",
                    role.id,
                    role.name,
                    role.description.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
