use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecorg_client::domain::{PointQuery, Registration, ReportQuery, ScheduleEntry};
use ecorg_client::{create_client, EcoRgClient, Session, SessionPhase};
use tracing::info;

/// `ecorg-client` command arguments.
///
/// Configuration is read from the environment (and `.env`):
/// `ECORG_API_URL`, `ECORG_API_TIMEOUT_SEC`, `ECORG_STATE_DIR`, `ECORG_METRICS_TYPE`.
#[derive(Debug, Parser)]
#[command(
    name = "ecorg-client",
    about = "Command-line client for the EcoRG recycling platform",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the signed-in account.
    Whoami,
    /// Sign in and store the token.
    Login { email: String, password: String },
    /// Create an account and sign in.
    Register {
        #[arg(value_name = "NAME")]
        nombre: String,
        email: String,
        password: String,
        #[arg(long, value_name = "PHONE")]
        telefono: Option<String>,
        #[arg(long, value_name = "ADDRESS")]
        direccion: Option<String>,
        #[arg(long, value_name = "NEIGHBOURHOOD")]
        barrio: Option<String>,
    },
    /// Forget the stored token.
    Logout,
    /// List approved reports.
    Reports { barrio: Option<String> },
    /// List recycling points.
    Points { barrio: Option<String> },
    /// Show the collection schedule.
    Schedule { barrio: Option<String> },
    /// Print client metrics.
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let client = create_client()?;
    info!("Starting EcoRG client v{}...", env!("CARGO_PKG_VERSION"));

    let session = client.resolve().await;

    match cli.command {
        Command::Whoami => whoami(&session),
        Command::Login { email, password } => {
            let identity = client.sign_in(&email, &password).await?;
            println!("Signed in as {}", identity.email.as_deref().unwrap_or(&identity.id));
        }
        Command::Register {
            nombre,
            email,
            password,
            telefono,
            direccion,
            barrio,
        } => {
            let registration = Registration {
                nombre,
                email,
                password,
                telefono,
                direccion,
                barrio,
            };
            let identity = client.sign_up(&registration).await?;
            println!("Registered {}", identity.email.as_deref().unwrap_or(&identity.id));
        }
        Command::Logout => {
            client.sign_out()?;
            println!("Signed out.");
        }
        Command::Reports { barrio } => list_reports(&client, barrio).await?,
        Command::Points { barrio } => list_points(&client, barrio).await?,
        Command::Schedule { barrio } => list_schedule(&client, barrio.as_deref()).await?,
        Command::Metrics => print!("{}", client.metrics().render()),
    }

    Ok(())
}

fn whoami(session: &Session) {
    match (session.phase(), &session.identity) {
        (SessionPhase::HasUser, Some(identity)) => println!(
            "{} <{}> ({})",
            identity.name.as_deref().unwrap_or("-"),
            identity.email.as_deref().unwrap_or("-"),
            identity.role.as_str()
        ),
        _ => println!("Not signed in."),
    }
}

async fn list_reports(client: &EcoRgClient, barrio: Option<String>) -> Result<()> {
    // ---
    let query = ReportQuery {
        barrio,
        ..ReportQuery::approved()
    };
    let screen = client.reports_screen();
    screen.load(&query).await.context("loading reports")?;

    for report in screen.items() {
        println!(
            "{:>6}  {:<12}  {:<40}  {}",
            report.short_id(),
            report.neighbourhood,
            report.title,
            report.address
        );
    }
    Ok(())
}

async fn list_points(client: &EcoRgClient, barrio: Option<String>) -> Result<()> {
    // ---
    let query = PointQuery {
        barrio,
        ..Default::default()
    };
    let points = client.points().list(&query).await.context("loading points")?;

    for point in points {
        println!(
            "{:<30}  {:<12}  {:<30}  {}",
            point.name,
            point.neighbourhood,
            point.address,
            point.materials.join(", ")
        );
    }
    Ok(())
}

async fn list_schedule(client: &EcoRgClient, barrio: Option<&str>) -> Result<()> {
    // ---
    let entries: Vec<ScheduleEntry> = match barrio {
        Some(barrio) => client.schedule().by_neighbourhood(barrio).await,
        None => client.schedule().list_all().await,
    }
    .context("loading schedule")?;

    for entry in entries {
        let windows = [entry.first_window.as_deref(), entry.second_window.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        println!("{:<16}  {:<30}  {}", entry.neighbourhood, entry.days.join(", "), windows);
    }
    Ok(())
}
