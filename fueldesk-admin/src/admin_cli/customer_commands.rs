use clap::Subcommand;

use fueldesk_api::models::CustomerInput;
use fueldesk_api::orm::customer::{get_all_customers, insert_customer, set_credit_limit};
use fueldesk_api::orm::ledger::get_balance;

use super::utils::{build_matcher, establish_connection};

#[derive(Subcommand)]
pub enum CustomerAction {
    #[command(about = "Add a new customer with an opening credit limit")]
    Add {
        #[arg(short, long, help = "Customer name")]
        name: String,
        #[arg(long, help = "Contact person")]
        contact: Option<String>,
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(long, help = "Agent ID")]
        agent_id: Option<i32>,
        #[arg(short, long, help = "Credit limit in cents", default_value_t = 0)]
        credit_limit: i64,
    },
    #[command(about = "List customers with their balances")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string")]
        fixed_string: bool,
    },
    #[command(about = "Set a customer's credit limit")]
    SetCreditLimit {
        #[arg(short, long, help = "Customer ID")]
        id: i32,
        #[arg(short, long, help = "New credit limit in cents")]
        credit_limit: i64,
    },
}

pub fn handle_customer_command(action: CustomerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;

    match action {
        CustomerAction::Add {
            name,
            contact,
            phone,
            agent_id,
            credit_limit,
        } => {
            let customer = insert_customer(
                &mut conn,
                CustomerInput {
                    name,
                    contact_person: contact,
                    phone,
                    agent_id,
                    credit_limit,
                },
                None,
            )?;
            println!("Created customer '{}' (ID: {})", customer.name, customer.id);
        }
        CustomerAction::Ls {
            search_term,
            fixed_string,
        } => {
            let customers = get_all_customers(&mut conn)?;
            let matcher = match search_term {
                Some(term) => Some(build_matcher(&term, fixed_string)?),
                None => None,
            };

            for customer in customers {
                if let Some(matcher) = &matcher {
                    if !matcher.is_match(&customer.name) {
                        continue;
                    }
                }
                let balance = get_balance(&mut conn, customer.id)?;
                let (limit, hold) = balance
                    .map(|b| (b.credit_limit, b.hold_balance))
                    .unwrap_or((0, 0));
                println!(
                    "{}\t{}\tlimit: {}\thold: {}\t{}",
                    customer.id,
                    customer.name,
                    limit,
                    hold,
                    if customer.is_active { "active" } else { "inactive" },
                );
            }
        }
        CustomerAction::SetCreditLimit { id, credit_limit } => {
            if set_credit_limit(&mut conn, id, credit_limit, None)? {
                println!("Credit limit for customer {} set to {}", id, credit_limit);
            } else {
                return Err("Refused: new limit is below the current hold balance, or no such customer".into());
            }
        }
    }

    Ok(())
}
