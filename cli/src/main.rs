use clap::{Parser, Subcommand, ValueEnum};
use stagger_cli::CliContext;
use stagger_cli::commands;
use stagger_cli::logging;
use stagger_cli::readline;
use stagger_core::FinishFlag;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = CliContext::new();

    loop {
        let line = match readline() {
            Ok(line) => line,
            Err(_) => {
                commands::exit(&ctx).await;
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "handicap race timing console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlagArg {
    Dnf,
    Early,
    None,
}

impl From<FlagArg> for FinishFlag {
    fn from(flag: FlagArg) -> Self {
        match flag {
            FlagArg::Dnf => FinishFlag::Dnf,
            FlagArg::Early => FinishFlag::EarlyStart,
            FlagArg::None => FinishFlag::None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new race (id defaults to the date)
    New {
        #[arg(short, long)]
        id: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    Load {
        id: String,
    },
    Save,
    ListRaces,
    Add {
        member: u32,
        name: String,
        /// 5km or 10km
        distance: String,
        /// MM:SS
        #[arg(long)]
        handicap: Option<String>,
        /// financial, provisional or casual
        #[arg(long)]
        membership: Option<String>,
    },
    Roster,
    Distance {
        distance: String,
        #[arg(long)]
        off: bool,
    },
    OpenCheckin,
    Checkin {
        member: u32,
    },
    /// Register a runner on the day with a temporary number
    Register {
        name: String,
        distance: String,
        #[arg(long)]
        handicap: Option<String>,
        #[arg(long)]
        membership: Option<String>,
    },
    Start {
        /// Run the clock fast for a rehearsal
        #[arg(long)]
        testing: bool,
    },
    Pause,
    Resume,
    Status,
    Finish {
        member: u32,
    },
    Flag {
        member: u32,
        #[arg(value_enum)]
        flag: FlagArg,
    },
    Edit {
        member: u32,
        minutes: i64,
        seconds: f64,
    },
    Clear {
        member: u32,
    },
    /// Close the race to further finishes and save it
    Finalize,
    Results,
    /// Write new handicaps back onto the roster and save
    Apply,
    /// Show the new handicap for a finish against a reference (all MM:SS)
    Adjust {
        handicap: String,
        finish: String,
        reference: String,
    },
    Config,
    TestingMode {
        #[arg(long)]
        off: bool,
    },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "stagger".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::New { id, date }) => {
            commands::new_race(id.as_deref(), date.as_deref(), ctx).await?
        }
        Some(Commands::Load { id }) => commands::load_race(&id, ctx).await?,
        Some(Commands::Save) => commands::save_race(ctx).await?,
        Some(Commands::ListRaces) => commands::list_races(ctx).await?,
        Some(Commands::Add {
            member,
            name,
            distance,
            handicap,
            membership,
        }) => {
            commands::add_runner(
                member,
                &name,
                &distance,
                handicap.as_deref(),
                membership.as_deref(),
                ctx,
            )
            .await?
        }
        Some(Commands::Roster) => commands::show_roster(ctx).await?,
        Some(Commands::Distance { distance, off }) => {
            commands::set_distance(&distance, !off, ctx).await?
        }
        Some(Commands::OpenCheckin) => commands::open_checkin(ctx).await?,
        Some(Commands::Checkin { member }) => commands::check_in(member, ctx).await?,
        Some(Commands::Register {
            name,
            distance,
            handicap,
            membership,
        }) => {
            commands::register(&name, &distance, handicap.as_deref(), membership.as_deref(), ctx)
                .await?
        }
        Some(Commands::Start { testing }) => commands::start(testing, ctx).await?,
        Some(Commands::Pause) => commands::pause(ctx).await?,
        Some(Commands::Resume) => commands::resume(ctx).await?,
        Some(Commands::Status) => commands::show_status(ctx).await?,
        Some(Commands::Finish { member }) => commands::record_finish(member, ctx).await?,
        Some(Commands::Flag { member, flag }) => {
            commands::set_flag(member, flag.into(), ctx).await?
        }
        Some(Commands::Edit {
            member,
            minutes,
            seconds,
        }) => commands::edit_time(member, minutes, seconds, ctx).await?,
        Some(Commands::Clear { member }) => commands::clear_finish(member, ctx).await?,
        Some(Commands::Finalize) => commands::finalize(ctx).await?,
        Some(Commands::Results) => commands::show_results(ctx).await?,
        Some(Commands::Apply) => commands::apply_results(ctx).await?,
        Some(Commands::Adjust {
            handicap,
            finish,
            reference,
        }) => commands::preview_adjustment(&handicap, &finish, &reference, ctx).await?,
        Some(Commands::Config) => commands::show_settings(ctx).await?,
        Some(Commands::TestingMode { off }) => commands::set_testing_mode(!off, ctx).await?,
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
