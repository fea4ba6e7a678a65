use clap::Subcommand;

use fueldesk_api::models::StationInput;
use fueldesk_api::orm::station::{get_all_stations, insert_station};
use fueldesk_api::orm::stock::get_station_stocks;

use super::utils::establish_connection;

#[derive(Subcommand)]
pub enum StationAction {
    #[command(about = "Add a new filling station")]
    Add {
        #[arg(short, long, help = "Station name")]
        name: String,
        #[arg(short, long, help = "Street address")]
        address: String,
    },
    #[command(about = "List stations")]
    Ls,
    #[command(about = "Show current stock levels at a station")]
    Stocks {
        #[arg(short, long, help = "Station ID")]
        id: i32,
    },
}

pub fn handle_station_command(action: StationAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;

    match action {
        StationAction::Add { name, address } => {
            let station = insert_station(&mut conn, StationInput { name, address }, None)?;
            println!("Created station '{}' (ID: {})", station.name, station.id);
        }
        StationAction::Ls => {
            for station in get_all_stations(&mut conn)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    station.id,
                    station.name,
                    station.address,
                    if station.is_active { "active" } else { "inactive" },
                );
            }
        }
        StationAction::Stocks { id } => {
            for stock in get_station_stocks(&mut conn, id)? {
                println!("product {}\t{:.1}", stock.product_id, stock.stock);
            }
        }
    }

    Ok(())
}
