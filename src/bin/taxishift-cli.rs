#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use taxishift::{
    booking::{BookingForm, BookingPolicy},
    dashboard::{render_row, Dashboard},
    io,
    model::{DriverType, ShiftId, ShiftSlot, TaxiId, UserId},
    notification::Notice,
    storage::JsonStore,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de réservation de services de taxi
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du store
    #[arg(long, global = true, default_value = "shifts.json")]
    store: String,

    /// Identifiant de l'utilisateur
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Date du jour (YYYY-MM-DD), par défaut la date locale
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct PolicyArgs {
    #[arg(long, default_value_t = 7)]
    permanent_min_days: i64,
    #[arg(long, default_value_t = 45)]
    permanent_max_days: i64,
    #[arg(long, default_value_t = 7)]
    temporary_max_days: i64,
}

impl From<PolicyArgs> for BookingPolicy {
    fn from(a: PolicyArgs) -> Self {
        BookingPolicy {
            permanent_min_days: a.permanent_min_days,
            permanent_max_days: a.permanent_max_days,
            temporary_max_days: a.temporary_max_days,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Réserver une plage de jours (un enregistrement par jour)
    Book {
        /// permanent | temporary
        #[arg(long)]
        driver_type: DriverType,
        #[arg(long)]
        taxi: TaxiId,
        /// morning | night
        #[arg(long)]
        shift: ShiftSlot,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Modifier un service existant
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        driver_type: DriverType,
        #[arg(long)]
        taxi: TaxiId,
        #[arg(long)]
        shift: ShiftSlot,
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Annuler un service
    Cancel {
        #[arg(long)]
        id: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Lister les taxis réservables
    Fleet,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let uid = UserId::new(&cli.user);
    let store = JsonStore::open(&cli.store)?;

    let code = match cli.cmd {
        Commands::Book {
            driver_type,
            taxi,
            shift,
            start,
            end,
            policy,
        } => {
            let mut dashboard = Dashboard::open(&store, uid, policy.into())?;
            dashboard.begin_add();
            let form = BookingForm {
                start_date: Some(start),
                end_date: Some(end),
                taxi_id: Some(taxi),
                shift: Some(shift),
                driver_type: Some(driver_type),
            };
            report(dashboard.submit(&form, today))
        }
        Commands::Edit {
            id,
            driver_type,
            taxi,
            shift,
            date,
            policy,
        } => {
            let mut dashboard = Dashboard::open(&store, uid, policy.into())?;
            let id = ShiftId::new(id);
            let record = dashboard
                .shifts()
                .into_iter()
                .find(|s| s.id == id)
                .with_context(|| format!("unknown shift: {id}"))?;
            dashboard.begin_edit(record);
            let form = BookingForm {
                start_date: Some(date),
                end_date: Some(date),
                taxi_id: Some(taxi),
                shift: Some(shift),
                driver_type: Some(driver_type),
            };
            report(dashboard.submit(&form, today))
        }
        Commands::Cancel { id } => {
            let mut dashboard = Dashboard::open(&store, uid, BookingPolicy::default())?;
            dashboard.begin_delete(ShiftId::new(id));
            report(dashboard.confirm_delete())
        }
        Commands::List { out_json, out_csv } => {
            let dashboard = Dashboard::open(&store, uid, BookingPolicy::default())?;
            let shifts = dashboard.shifts();
            if let Some(path) = out_json {
                io::export_shifts_json(path, &shifts)?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &shifts)?;
            }
            for s in &shifts {
                println!("{} | {}", s.id.as_str(), render_row(s));
            }
            dashboard.close();
            0
        }
        Commands::Fleet => {
            for taxi in TaxiId::fleet() {
                println!("{taxi}");
            }
            0
        }
    };

    std::process::exit(code);
}

fn report(notice: Option<Notice>) -> i32 {
    match notice {
        Some(n) if n.is_success() => {
            println!("{n}");
            0
        }
        Some(n) => {
            eprintln!("{n}");
            1
        }
        None => 1,
    }
}
