use std::io::Write;
use std::time::Instant;

use chrono::{Local, NaiveDate, Utc};
use stagger_core::storage::RaceStore;
use stagger_core::timing;
use stagger_core::{
    Distance, FinishFlag, Handicap, HandicapEngine, MemberNumber, Membership, Race, RaceClock,
    ResultsRanker, Runner, Schedule,
};

use crate::CliContext;

fn parse_distance(text: &str) -> Result<Distance, String> {
    text.parse()
}

fn parse_membership(text: Option<&str>) -> Result<Membership, String> {
    text.map(str::parse::<Membership>).transpose().map(Option::unwrap_or_default)
}

fn parse_handicap(text: Option<&str>) -> Result<Handicap, String> {
    text.map(|t| t.parse::<Handicap>().map_err(|e| e.to_string()))
        .transpose()
        .map(Option::unwrap_or_default)
}

// ─── Race files ─────────────────────────────────────────────────────────────

pub async fn new_race(id: Option<&str>, date: Option<&str>, ctx: &CliContext) -> Result<(), String> {
    let date = match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| e.to_string())?,
        None => Local::now().date_naive(),
    };
    let id = id
        .map(String::from)
        .unwrap_or_else(|| date.format("%Y-%m-%d").to_string());

    ctx.set_race(Race::new(id.clone(), date)).await;
    println!("New race {id} on {date}");
    Ok(())
}

pub async fn load_race(id: &str, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.store.load_race(id).map_err(|e| e.to_string())?;
    let status = race.status();
    let runners = race.runners().len();
    ctx.set_race(race).await;
    println!("Loaded race {id} ({status}, {runners} runners)");
    Ok(())
}

pub async fn save_race(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    live.checkpoint(Instant::now(), Utc::now());
    ctx.store.save_race(&live.race).map_err(|e| e.to_string())?;
    println!("Saved race {} to {}", live.race.id, ctx.store.dir().display());
    Ok(())
}

pub async fn list_races(ctx: &CliContext) -> Result<(), String> {
    let ids = ctx.store.list_races().map_err(|e| e.to_string())?;
    if ids.is_empty() {
        println!("No saved races in {}", ctx.store.dir().display());
        return Ok(());
    }
    for id in &ids {
        println!("{id}");
    }
    println!("\nTotal: {} races", ids.len());
    Ok(())
}

// ─── Roster and check-in ────────────────────────────────────────────────────

pub async fn add_runner(
    member_number: MemberNumber,
    name: &str,
    distance: &str,
    handicap: Option<&str>,
    membership: Option<&str>,
    ctx: &CliContext,
) -> Result<(), String> {
    let runner = Runner::new(member_number, name, parse_distance(distance)?)
        .with_handicap(parse_handicap(handicap)?)
        .with_membership(parse_membership(membership)?);

    let race = ctx.race().await?;
    race.write()
        .await
        .race
        .add_runner(runner)
        .map_err(|e| e.to_string())?;
    println!("Added {member_number} {name}");
    Ok(())
}

pub async fn show_roster(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let live = race.read().await;

    println!(
        "Race {} on {} ({})",
        live.race.id,
        live.race.date,
        live.race.status()
    );
    println!(
        "{:<8} {:<30} {:<6} {:<9} {:<12} {:<4} Status",
        "Member", "Name", "Dist", "Handicap", "Membership", "In"
    );
    println!("{}", "-".repeat(90));
    if let Some(next) = live.race.temp_numbers().peek() {
        println!("Next on-the-day number: {next}");
    }
    for runner in live.race.runners() {
        println!(
            "{:<8} {:<30} {:<6} {:<9} {:<12} {:<4} {}",
            runner.member_number,
            runner.full_name,
            runner.distance.to_string(),
            runner.handicap().to_string(),
            format!("{:?}", runner.membership).to_lowercase(),
            if runner.checked_in { "yes" } else { "" },
            runner.status
        );
    }
    Ok(())
}

pub async fn set_distance(distance: &str, active: bool, ctx: &CliContext) -> Result<(), String> {
    let distance = parse_distance(distance)?;
    let race = ctx.race().await?;
    race.write()
        .await
        .race
        .set_distance_active(distance, active)
        .map_err(|e| e.to_string())?;
    println!("{distance} {}", if active { "enabled" } else { "disabled" });
    Ok(())
}

pub async fn open_checkin(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    race.write()
        .await
        .race
        .open_checkin()
        .map_err(|e| e.to_string())?;
    println!("Check-in open");
    Ok(())
}

pub async fn check_in(member_number: MemberNumber, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    live.race.check_in(member_number).map_err(|e| e.to_string())?;
    if let Some(runner) = live.race.runner(member_number) {
        println!(
            "Checked in {} {} ({}, {})",
            runner.member_number,
            runner.full_name,
            runner.distance,
            runner.handicap()
        );
    }
    Ok(())
}

pub async fn register(
    name: &str,
    distance: &str,
    handicap: Option<&str>,
    membership: Option<&str>,
    ctx: &CliContext,
) -> Result<(), String> {
    let distance = parse_distance(distance)?;
    let handicap = parse_handicap(handicap)?;
    let membership = parse_membership(membership)?;

    let race = ctx.race().await?;
    let number = race
        .write()
        .await
        .race
        .register_on_the_day(name, distance, handicap, membership)
        .map_err(|e| e.to_string())?;
    println!("Registered {name} with race number {number}");
    Ok(())
}

// ─── Race clock ─────────────────────────────────────────────────────────────

pub async fn start(testing: bool, ctx: &CliContext) -> Result<(), String> {
    let testing = testing || ctx.config.read().await.testing_mode;
    let (_, speed) = ctx.config.read().await.clock.cadence(testing);

    let race = ctx.race().await?;
    {
        let mut live = race.write().await;
        live.race.start(Utc::now()).map_err(|e| e.to_string())?;
        live.clock = RaceClock::new(speed);
        live.clock.start(Instant::now());
    }

    ctx.start_session(testing).await;
    if testing {
        println!("Race started in testing mode ({speed}x)");
    } else {
        println!("Race started");
    }
    Ok(())
}

pub async fn pause(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    live.clock.pause(Instant::now());
    println!("Clock paused at {}", timing::format(live.elapsed_ms(Instant::now())));
    Ok(())
}

pub async fn resume(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    live.clock.start(Instant::now());
    println!("Clock resumed at {}", timing::format(live.elapsed_ms(Instant::now())));
    Ok(())
}

pub async fn show_status(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let schedule = {
        let live = race.read().await;
        Schedule::project(
            live.race.checked_in_runners(),
            live.elapsed_ms(Instant::now()),
            live.projection_mode(),
        )
    };

    println!("Elapsed {}", timing::format(schedule.elapsed_ms));
    println!("{}", schedule.status_message());
    for cohort in &schedule.cohorts {
        println!("{}", cohort.board_line());
    }

    let mut board = ctx.board.write().await;
    for alert in board.active(Instant::now()) {
        println!("! {}", alert.text);
    }
    Ok(())
}

// ─── Finishes ───────────────────────────────────────────────────────────────

pub async fn record_finish(member_number: MemberNumber, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    let elapsed_ms = live.elapsed_ms(Instant::now());
    live.race
        .record_finish(member_number, elapsed_ms)
        .map_err(|e| e.to_string())?;
    println!("{member_number} finished in {}", timing::format(elapsed_ms));
    Ok(())
}

pub async fn set_flag(member_number: MemberNumber, flag: FinishFlag, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let status = race
        .write()
        .await
        .race
        .set_flag(member_number, flag)
        .map_err(|e| e.to_string())?;
    println!("{member_number} is now {status}");
    Ok(())
}

pub async fn edit_time(member_number: MemberNumber, minutes: i64, seconds: f64, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    let mut live = race.write().await;
    live.race
        .edit_time(member_number, minutes, seconds)
        .map_err(|e| e.to_string())?;
    let time = live
        .race
        .finishes()
        .get(member_number)
        .and_then(|r| r.finish_time())
        .unwrap_or_default();
    println!("{member_number} finish time set to {time}");
    Ok(())
}

pub async fn clear_finish(member_number: MemberNumber, ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    race.write()
        .await
        .race
        .clear_finish(member_number)
        .map_err(|e| e.to_string())?;
    println!("Cleared finish for {member_number}");
    Ok(())
}

// ─── Results ────────────────────────────────────────────────────────────────

async fn ranker(ctx: &CliContext) -> ResultsRanker {
    let config = ctx.config.read().await;
    ResultsRanker::new(config.points.clone(), HandicapEngine::new(config.handicap))
}

pub async fn finalize(ctx: &CliContext) -> Result<(), String> {
    let race = ctx.race().await?;
    race.write()
        .await
        .race
        .finish()
        .map_err(|e| e.to_string())?;
    ctx.stop_session().await;
    println!("Race finished");
    save_race(ctx).await
}

pub async fn show_results(ctx: &CliContext) -> Result<(), String> {
    let ranker = ranker(ctx).await;
    let race = ctx.race().await?;
    let live = race.read().await;
    let results = ranker.rank(live.race.runners(), live.race.finishes());

    if results.is_empty() {
        println!("No runners checked in");
        return Ok(());
    }

    for distance in &results {
        println!("\n{}", distance.distance);
        println!(
            "{:<4} {:<8} {:<30} {:<8} {:<9} {:<9} {:<11} Pts",
            "Pos", "Member", "Name", "Time", "Old", "New", "Status"
        );
        println!("{}", "-".repeat(90));
        for row in &distance.rows {
            println!(
                "{:<4} {:<8} {:<30} {:<8} {:<9} {:<9} {:<11} {}",
                row.position.map(|p| p.to_string()).unwrap_or_default(),
                row.member_number,
                row.full_name,
                row.finish_time.as_deref().unwrap_or("-"),
                row.old_handicap.to_string(),
                row.new_handicap.to_string(),
                row.status.to_string(),
                row.points_earned
            );
        }
    }
    Ok(())
}

/// Preview the handicap a finish would earn against a reference time
pub async fn preview_adjustment(handicap: &str, finish: &str, reference: &str, ctx: &CliContext) -> Result<(), String> {
    let finish_ms = timing::parse(finish).map_err(|e| e.to_string())?;
    let reference_ms = timing::parse(reference).map_err(|e| e.to_string())?;
    let engine = HandicapEngine::new(ctx.config.read().await.handicap);
    let new_handicap = engine
        .recalculate(handicap, finish_ms, reference_ms)
        .map_err(|e| e.to_string())?;
    println!("{handicap} -> {new_handicap}");
    Ok(())
}

pub async fn apply_results(ctx: &CliContext) -> Result<(), String> {
    let ranker = ranker(ctx).await;
    let race = ctx.race().await?;
    let changed = {
        let mut live = race.write().await;
        let results = ranker.rank(live.race.runners(), live.race.finishes());
        live.race.apply_results(&results).map_err(|e| e.to_string())?
    };
    println!("Updated {changed} handicaps");
    save_race(ctx).await
}

// ─── Settings ───────────────────────────────────────────────────────────────

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    println!("{config:#?}");
    println!("Race files: {}", ctx.store.dir().display());
    Ok(())
}

pub async fn set_testing_mode(enabled: bool, ctx: &CliContext) -> Result<(), String> {
    use stagger_core::AppConfigExt;

    let mut config = ctx.config.write().await;
    config.testing_mode = enabled;
    config.save().map_err(|e| e.to_string())?;
    println!("Testing mode {}", if enabled { "on" } else { "off" });
    Ok(())
}

pub async fn exit(ctx: &CliContext) {
    ctx.stop_session().await;
    println!("quitting...");
    std::io::stdout().flush().ok();
}
