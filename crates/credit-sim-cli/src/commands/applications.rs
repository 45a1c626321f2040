use clap::{Args, Subcommand};

use credit_sim_core::amortization::product::ProductParameters;
use credit_sim_core::applications::intake::CreditApplication;
use credit_sim_core::applications::store::{ApplicationStore, CsvApplicationStore};
use credit_sim_core::applications::submit::submit_application;

use crate::input;
use crate::output::{ApplicationListing, Report};

const DEFAULT_STORE: &str = "solicitudes.csv";

/// Arguments for submitting a credit application
#[derive(Args)]
pub struct ApplyArgs {
    /// Path to JSON application file (or pipe it on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// CSV sheet the application is appended to
    #[arg(long, default_value = DEFAULT_STORE)]
    pub store: String,
}

/// Arguments for browsing stored applications
#[derive(Args)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsCommand,

    /// CSV sheet holding the applications
    #[arg(long, default_value = DEFAULT_STORE, global = true)]
    pub store: String,
}

#[derive(Subcommand)]
pub enum ApplicationsCommand {
    /// List every stored application
    List,
    /// Show one application by id
    Show {
        /// Application id (case-insensitive)
        id: String,
    },
}

pub fn run_apply(
    args: ApplyArgs,
    params: &ProductParameters,
) -> Result<Report, Box<dyn std::error::Error>> {
    let application: CreditApplication = input::read_request(
        args.input.as_deref(),
        "--input file (or piped JSON) is required to submit an application",
    )?;

    let mut store = CsvApplicationStore::open(&args.store);
    let receipt = submit_application(&application, &mut store, params)?;
    Ok(Report::Receipt(receipt))
}

pub fn run_applications(args: ApplicationsArgs) -> Result<Report, Box<dyn std::error::Error>> {
    let store = CsvApplicationStore::open(&args.store);
    match args.command {
        ApplicationsCommand::List => {
            let applications = store.list()?;
            Ok(Report::Applications(ApplicationListing {
                store: store.path().display().to_string(),
                total: applications.len(),
                applications,
            }))
        }
        ApplicationsCommand::Show { id } => Ok(Report::Application(store.find(&id)?)),
    }
}
