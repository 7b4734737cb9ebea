use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    filter_cargos, CargoApi, CargoField, CargoForm, CargoListController, HttpCargoApi, Outcome,
};
use shared::{
    domain::{Airport, Cargo, CargoId, CargoStatus, CargoType},
    protocol::TrackingDraft,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "aircargo-admin", about = "Manage cargo records on the air cargo backend")]
struct Cli {
    /// Config file, `aircargo.toml` in the working directory when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cargo records, optionally narrowed by a search term or status.
    ///
    /// `--status`, `--flight` and `--keyword` query the backend; `--search`
    /// then filters the result locally.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, conflicts_with_all = ["flight", "keyword"])]
        status: Option<CargoStatus>,
        #[arg(long, conflicts_with = "keyword")]
        flight: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Show {
        cargo_id: String,
        #[arg(long)]
        json: bool,
    },
    Create(CreateArgs),
    /// Open a record for edit, apply the given fields and submit it.
    Edit {
        cargo_id: String,
        #[command(flatten)]
        fields: FieldOverrides,
    },
    Delete {
        cargo_id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    Count {
        #[arg(long)]
        status: CargoStatus,
    },
    /// Show the tracking history of a record, newest first.
    Tracking {
        cargo_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Append a tracking entry to a record.
    Track {
        cargo_id: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        handler: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    flight_number: String,
    #[arg(long)]
    origin: Airport,
    #[arg(long)]
    destination: Airport,
    #[arg(long)]
    cargo_type: CargoType,
    #[arg(long, allow_hyphen_values = true)]
    weight: String,
    #[arg(long, allow_hyphen_values = true)]
    volume: String,
    #[arg(long)]
    shipper: String,
    #[arg(long)]
    consignee: String,
}

impl CreateArgs {
    fn into_form(self) -> CargoForm {
        let mut form = CargoForm::for_create();
        form.set(CargoField::FlightNumber, self.flight_number);
        form.set(CargoField::OriginAirport, self.origin.as_str());
        form.set(CargoField::DestinationAirport, self.destination.as_str());
        form.set(CargoField::CargoType, self.cargo_type.as_str());
        form.set(CargoField::Weight, self.weight);
        form.set(CargoField::Volume, self.volume);
        form.set(CargoField::ShipperName, self.shipper);
        form.set(CargoField::ConsigneeName, self.consignee);
        form
    }
}

#[derive(Args, Debug)]
struct FieldOverrides {
    #[arg(long)]
    flight_number: Option<String>,
    #[arg(long)]
    origin: Option<Airport>,
    #[arg(long)]
    destination: Option<Airport>,
    #[arg(long)]
    cargo_type: Option<CargoType>,
    #[arg(long, allow_hyphen_values = true)]
    weight: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    volume: Option<String>,
    #[arg(long)]
    shipper: Option<String>,
    #[arg(long)]
    consignee: Option<String>,
    /// Raw `field=value` assignment by form field name, e.g. `shipperName=Acme`.
    /// Applied after the named flags.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(CargoField, String)>,
}

fn parse_assignment(raw: &str) -> Result<(CargoField, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = name.parse::<CargoField>().map_err(|err| err.to_string())?;
    Ok((field, value.to_string()))
}

impl FieldOverrides {
    fn changes(self) -> Vec<(CargoField, String)> {
        [
            (CargoField::FlightNumber, self.flight_number),
            (CargoField::OriginAirport, self.origin.map(|v| v.as_str().to_string())),
            (
                CargoField::DestinationAirport,
                self.destination.map(|v| v.as_str().to_string()),
            ),
            (CargoField::CargoType, self.cargo_type.map(|v| v.as_str().to_string())),
            (CargoField::Weight, self.weight),
            (CargoField::Volume, self.volume),
            (CargoField::ShipperName, self.shipper),
            (CargoField::ConsigneeName, self.consignee),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .chain(self.assignments)
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    init_tracing(&settings.log_filter);
    debug!(server_url = %settings.server_url, "using cargo backend");

    let api = HttpCargoApi::with_timeout(&settings.server_url, settings.request_timeout())?;
    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let mut controller = CargoListController::new(api, move |cargo_id: &CargoId, prompt: &str| {
        assume_yes || confirm_on_stdin(cargo_id, prompt)
    });

    match cli.command {
        Command::List {
            search,
            status,
            flight,
            keyword,
            json,
        } => {
            let term = search.unwrap_or_default();
            let queried = match (status, flight, keyword) {
                (Some(status), _, _) => {
                    Some(controller.api().list_cargo_by_status(status).await?)
                }
                (None, Some(flight), _) => {
                    Some(controller.api().list_cargo_by_flight(&flight).await?)
                }
                (None, None, Some(keyword)) => {
                    Some(controller.api().search_cargo(&keyword).await?)
                }
                (None, None, None) => None,
            };
            match queried {
                Some(cargos) => print_cargos(&filter_cargos(&cargos, &term), json)?,
                None => {
                    expect_completed(controller.load().await, "loading the cargo list")?;
                    print_cargos(&controller.filter(&term), json)?;
                }
            }
        }
        Command::Show { cargo_id, json } => {
            let cargo_id = CargoId::new(cargo_id);
            let cargo = controller
                .api()
                .get_cargo(&cargo_id)
                .await?
                .ok_or_else(|| anyhow!("cargo {cargo_id} not found"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cargo)?);
            } else {
                print!("{}", render::cargo_detail(&cargo));
            }
        }
        Command::Create(args) => {
            expect_completed(controller.create(args.into_form()).await, "creating cargo")?;
            println!(
                "created cargo record ({} records on the backend)",
                controller.state().cargos.len()
            );
        }
        Command::Edit { cargo_id, fields } => {
            let cargo_id = CargoId::new(cargo_id);
            expect_completed(controller.load().await, "loading the cargo list")?;
            if !controller.open_for_edit(&cargo_id) {
                bail!("cargo {cargo_id} not found");
            }
            let changes = fields.changes();
            if changes.is_empty() {
                warn!(%cargo_id, "no fields given, submitting the record unchanged");
            }
            for (field, value) in changes {
                controller.field_changed(field, value);
            }
            expect_completed(controller.submit().await, "updating cargo")?;
            println!("updated cargo {cargo_id}");
        }
        Command::Delete { cargo_id, .. } => {
            let cargo_id = CargoId::new(cargo_id);
            expect_completed(controller.remove(&cargo_id).await, "deleting cargo")?;
            println!("deleted cargo {cargo_id}");
        }
        Command::Count { status } => {
            let count = controller.api().count_cargo_by_status(status).await?;
            println!("{count}");
        }
        Command::Tracking { cargo_id, json } => {
            let entries = controller
                .api()
                .list_tracking(&CargoId::new(cargo_id))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", render::tracking_table(&entries));
            }
        }
        Command::Track {
            cargo_id,
            location,
            status,
            handler,
            notes,
        } => {
            let draft = TrackingDraft {
                location,
                status,
                handler_id: handler,
                notes,
            };
            let entry = controller
                .api()
                .create_tracking(&CargoId::new(cargo_id), &draft)
                .await?;
            println!(
                "recorded tracking {} for cargo {}",
                entry.tracking_id, entry.cargo_id
            );
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn expect_completed(outcome: Outcome, what: &str) -> Result<()> {
    match outcome {
        Outcome::Completed => Ok(()),
        Outcome::Rejected(err) => Err(err).with_context(|| format!("{what} was rejected")),
        Outcome::Failed => bail!("{what} failed, the backend request did not succeed"),
        Outcome::Cancelled => bail!("{what} was cancelled"),
        Outcome::Ignored => bail!("{what} had no effect"),
    }
}

fn print_cargos(cargos: &[&Cargo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(cargos)?);
    } else {
        print!("{}", render::cargo_table(cargos));
    }
    Ok(())
}

fn confirm_on_stdin(cargo_id: &CargoId, prompt: &str) -> bool {
    let mut stderr = io::stderr();
    if write!(stderr, "{prompt} ({cargo_id}) [y/N]: ")
        .and_then(|()| stderr.flush())
        .is_err()
    {
        return false;
    }
    let mut answer = String::new();
    if let Err(err) = io::stdin().lock().read_line(&mut answer) {
        warn!("failed to read confirmation: {err}");
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
