use anyhow::{Context, Result};
use attendance_ledger::access::require_admin;
use attendance_ledger::attendance::report::{CSV_CONTENT_TYPE, export_file_name};
use attendance_ledger::database;
use attendance_ledger::utils::format::{
    format_history, format_report_table, format_success_message, format_today_status,
};
use attendance_ledger::utils::time::{
    format_datetime_local, format_duration_minutes, jakarta_offset, local_date, parse_datetime_utc,
};
use attendance_ledger::{
    AttendanceAction, AttendanceError, AttendanceLedger, Config, LedgerPolicy, Person,
    PersonDirectory, ReportAggregator, ReportFilter, Role, SqliteAttendanceStore,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "attendance-ledger",
    version,
    about = "Daily attendance check-in/check-out ledger"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the person directory
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },
    /// Check in for today
    CheckIn(PunchArgs),
    /// Check out of today's session
    CheckOut(PunchArgs),
    /// Record an action given as `check-in` or `check-out`
    Punch {
        action: AttendanceAction,
        #[command(flatten)]
        punch: PunchArgs,
    },
    /// Show today's status for a person
    Status(PunchArgs),
    /// Show a person's attendance history, newest first
    History {
        person_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Show the attendance report for all employees (admin only)
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Export the attendance report as CSV (admin only)
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output path, `-` for stdout. Defaults to attendance_report_<date>.csv
        #[arg(long, short)]
        output: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Add or update a person
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        #[arg(long, default_value = "EMPLOYEE")]
        role: Role,
    },
    /// List everyone in the directory
    List,
}

#[derive(Args, Debug)]
pub struct PunchArgs {
    pub person_id: String,
    /// Override the current time (RFC 3339)
    #[arg(long, value_parser = parse_datetime_utc)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Period {
    Today,
    Week,
    Month,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Id of the admin requesting the report
    #[arg(long = "as")]
    pub requester: String,
    #[arg(long, value_enum)]
    pub period: Option<Period>,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub person: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    /// Override the current time (RFC 3339)
    #[arg(long, value_parser = parse_datetime_utc)]
    pub at: Option<DateTime<Utc>>,
}

impl FilterArgs {
    fn now(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }

    pub fn to_filter(&self, offset: FixedOffset) -> ReportFilter {
        let now = self.now();

        let mut filter = match self.period {
            Some(Period::Today) => ReportFilter::today(now, offset),
            Some(Period::Week) => ReportFilter::this_week(now, offset),
            Some(Period::Month) => ReportFilter::this_month(now, offset),
            None => ReportFilter::default(),
        };

        if self.from.is_some() {
            filter.from = self.from;
        }
        if self.to.is_some() {
            filter.to = self.to;
        }
        filter.person_id = self.person.clone();
        filter.department = self.department.clone();
        filter
    }
}

struct App {
    offset: FixedOffset,
    store: Arc<SqliteAttendanceStore>,
    ledger: AttendanceLedger,
    reports: ReportAggregator,
}

impl App {
    async fn open(config: Config) -> Result<Self> {
        let pool = database::create_connection(&config.database_url)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?;
        let store = Arc::new(SqliteAttendanceStore::new(pool));

        let ledger = AttendanceLedger::new(
            store.clone(),
            store.clone(),
            LedgerPolicy::from_config(&config),
        );
        let offset = jakarta_offset();
        let reports = ReportAggregator::new(store.clone(), offset);

        Ok(Self {
            offset,
            store,
            ledger,
            reports,
        })
    }

    async fn person_name(&self, person_id: &str) -> Result<String> {
        Ok(self
            .store
            .get_person(person_id)
            .await?
            .map(|person| person.name)
            .ok_or_else(|| AttendanceError::NotFound(person_id.to_string()))?)
    }

    async fn punch(&self, action: AttendanceAction, args: &PunchArgs) -> Result<()> {
        let now = args.at.unwrap_or_else(Utc::now);
        let record = self.ledger.apply(action, &args.person_id, now).await?;

        let offset = self.offset;
        let at = match action {
            AttendanceAction::CheckIn => record.check_in_time,
            AttendanceAction::CheckOut => record.check_out_time.unwrap_or(now),
        };
        let mut message = format!(
            "{} {} at {} ({})",
            record.person_id,
            action,
            format_datetime_local(at, offset),
            record.status
        );
        if let Some(minutes) = record.worked_minutes() {
            message.push_str(&format!(", worked {}", format_duration_minutes(minutes)));
        }
        println!("{}", format_success_message(&message));
        Ok(())
    }

    async fn status(&self, args: &PunchArgs) -> Result<()> {
        let now = args.at.unwrap_or_else(Utc::now);
        let name = self.person_name(&args.person_id).await?;
        let status = self.ledger.today_status_for(&args.person_id, now).await?;

        let today = local_date(now, self.offset);
        println!("{}", format_today_status(&name, today, status));
        Ok(())
    }

    async fn history(&self, person_id: &str, json: bool) -> Result<()> {
        let records = self.ledger.history_for(person_id).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            println!("{}", format_history(&records, self.offset));
        }
        Ok(())
    }

    async fn authorize(&self, requester: &str) -> Result<Person> {
        Ok(require_admin(self.store.as_ref(), requester).await?)
    }

    async fn report(&self, args: &FilterArgs, json: bool) -> Result<()> {
        self.authorize(&args.requester).await?;

        let filter = args.to_filter(self.offset);
        let rows = self.reports.all_records(Some(&filter)).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print!("{}", format_report_table(&rows, self.offset));
        }
        Ok(())
    }

    async fn export(&self, args: &FilterArgs, output: Option<&str>) -> Result<()> {
        self.authorize(&args.requester).await?;

        let filter = args.to_filter(self.offset);
        let body = self.reports.export_csv(Some(&filter)).await?;

        match output {
            Some("-") => {
                std::io::stdout().write_all(&body)?;
            }
            path => {
                let path = path.map(str::to_string).unwrap_or_else(|| {
                    export_file_name(local_date(args.now(), self.offset))
                });
                std::fs::write(&path, &body).with_context(|| format!("failed to write {}", path))?;
                eprintln!(
                    "{}",
                    format_success_message(&format!(
                        "wrote {} bytes of {} to {}",
                        body.len(),
                        CSV_CONTENT_TYPE,
                        path
                    ))
                );
            }
        }
        Ok(())
    }

    async fn person(&self, command: PersonCommand) -> Result<()> {
        match command {
            PersonCommand::Add {
                id,
                name,
                department,
                role,
            } => {
                let person = Person {
                    id,
                    name,
                    department,
                    role,
                };
                self.store.upsert_person(&person).await?;
                let message = format!("saved {} ({})", person.id, person.role.as_str());
                println!("{}", format_success_message(&message));
            }
            PersonCommand::List => {
                for person in self.store.list_persons().await? {
                    println!(
                        "{}\t{}\t{}\t{}",
                        person.id,
                        person.name,
                        person.department,
                        person.role.as_str()
                    );
                }
            }
        }
        Ok(())
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let app = App::open(config).await?;

    match cli.command {
        Commands::Person { command } => app.person(command).await,
        Commands::CheckIn(args) => app.punch(AttendanceAction::CheckIn, &args).await,
        Commands::CheckOut(args) => app.punch(AttendanceAction::CheckOut, &args).await,
        Commands::Punch { action, punch } => app.punch(action, &punch).await,
        Commands::Status(args) => app.status(&args).await,
        Commands::History { person_id, json } => app.history(&person_id, json).await,
        Commands::Report { filter, json } => app.report(&filter, json).await,
        Commands::Export { filter, output } => app.export(&filter, output.as_deref()).await,
    }
}

/// Process exit code for a failed command, by error kind.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<AttendanceError>() {
        Some(
            AttendanceError::AlreadyCheckedIn { .. }
            | AttendanceError::NoOpenSession { .. }
            | AttendanceError::AlreadyCheckedOut { .. }
            | AttendanceError::InvalidOrdering { .. },
        ) => 3,
        Some(AttendanceError::NotFound(_)) => 4,
        Some(AttendanceError::Unauthorized(_)) => 5,
        Some(AttendanceError::InvalidAction(_) | AttendanceError::InvalidFilter(_)) => 2,
        _ => 1,
    }
}
