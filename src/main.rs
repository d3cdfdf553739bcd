use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use clinic_records::config::{AppConfig, APP_NAME, APP_VERSION};
use clinic_records::core_state::CoreState;
use clinic_records::credentials::{self, NewStaff};
use clinic_records::models::Role;
use clinic_records::{api, db, init_tracing};

#[derive(Parser)]
#[command(name = APP_NAME, version = APP_VERSION)]
#[command(about = "Role-based patient records API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Create or upgrade the database schema, then exit
    Migrate,
    /// Create a receptionist or doctor account
    ProvisionStaff {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// `receptionist` or `doctor`
        #[arg(long)]
        role: String,
        #[arg(long)]
        password: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{APP_NAME}: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);
    tracing::info!("{APP_NAME} v{APP_VERSION} starting");

    match run(cli.command.unwrap_or(Commands::Serve), config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: AppConfig) -> Result<(), String> {
    match command {
        Commands::Serve => {
            let core = Arc::new(CoreState::initialize(config).map_err(|e| e.to_string())?);
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| format!("Failed to start runtime: {e}"))?;
            runtime.block_on(api::server::serve(core))
        }
        Commands::Migrate => {
            let conn = db::open_database(&config.database_path).map_err(|e| e.to_string())?;
            tracing::info!(
                version = db::get_current_version(&conn),
                "Database schema is current"
            );
            Ok(())
        }
        Commands::ProvisionStaff {
            name,
            email,
            role,
            password,
        } => {
            let role: Role = role.parse().map_err(|e: db::DatabaseError| e.to_string())?;
            let core = CoreState::initialize(config).map_err(|e| e.to_string())?;
            let conn = core.open_db().map_err(|e| e.to_string())?;
            let staff = NewStaff {
                name,
                email,
                password,
                role,
            };
            let id = credentials::provision_staff(&conn, &staff, core.password_cost())
                .map_err(|e| e.to_string())?;
            println!("{role} account created with id {id}");
            Ok(())
        }
    }
}
