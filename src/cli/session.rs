//! Session command implementations

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::analysis::stints::drivers_without_stints;
use crate::analysis::summary::RaceSummary;
use crate::analysis::{
    DriverPace, PitStop, Stint, StrategySummary, driver_pace, strategy_summary, summarize,
};
use crate::cache::LoadedSession;
use crate::cli::{CommandContext, GlobalOptions, OutputFormat, SessionArgs};
use crate::error::Result;
use crate::models::Compound;
use crate::models::display::{FinisherDisplay, PaceDisplay, PitStopDisplay, StintDisplay};
use crate::output::formatters::{format_lap_millis, or_dash};
use crate::output::{json, table};
use crate::session::SessionType;

/// Stints plus the drivers that had no tire data at all
#[derive(Debug, Serialize)]
struct StintReport<'a> {
    stints: Vec<&'a Stint>,
    no_tire_data: Vec<String>,
}

/// Pit stops plus the field-wide strategy pattern
#[derive(Debug, Serialize)]
struct PitReport<'a> {
    stops: Vec<&'a PitStop>,
    summary: StrategySummary,
}

/// Run the summary command
pub async fn summary(opts: &GlobalOptions, args: &SessionArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let loaded = ctx.load(args).await?;
    let summary = summarize(&loaded.data, &loaded.pit_stops);

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", json::format_session_json(&summary, &loaded)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{}", loaded.id.to_string().bold());
            println!("{}", table::format_pairs(&summary_pairs(&summary)));
            if !summary.podium.is_empty() {
                let podium: Vec<FinisherDisplay> =
                    summary.podium.iter().map(FinisherDisplay::from).collect();
                println!("{}", table::format_table(&podium));
            }
        }
    }

    Ok(())
}

fn summary_pairs(summary: &RaceSummary) -> Vec<(&'static str, String)> {
    let mut pairs = vec![(
        "Winner",
        summary
            .winner
            .as_ref()
            .map(|w| match &w.team {
                Some(team) => format!("{} ({})", w.driver, team),
                None => w.driver.clone(),
            })
            .unwrap_or_else(|| "-".to_string()),
    )];

    pairs.push((
        "Fastest lap",
        summary
            .fastest_lap
            .as_ref()
            .map(|f| {
                format!(
                    "{} {} (lap {})",
                    f.driver,
                    format_lap_millis(f.lap_time_ms),
                    f.lap_number
                )
            })
            .unwrap_or_else(|| "-".to_string()),
    ));
    pairs.push(("Total laps", or_dash(summary.total_laps)));
    pairs.push(("Pit stops", summary.pit_stops.to_string()));

    if let Some(weather) = &summary.weather {
        pairs.push(("Air temp", celsius(weather.avg_air_temp)));
        pairs.push(("Track temp", celsius(weather.avg_track_temp)));
        pairs.push((
            "Wind",
            weather
                .avg_wind_kph
                .map(|w| format!("{:.1} km/h", w))
                .unwrap_or_else(|| "-".to_string()),
        ));
        pairs.push((
            "Rainfall",
            if weather.rainfall { "yes" } else { "no" }.to_string(),
        ));
    }

    pairs
}

fn celsius(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1} °C", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Run the stints command
pub async fn stints(opts: &GlobalOptions, args: &SessionArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let loaded = ctx.load(args).await?;

    let shown: Vec<&Stint> = loaded
        .stints
        .iter()
        .filter(|s| args.includes(&s.driver))
        .collect();
    let no_tire_data: Vec<String> = drivers_without_stints(&loaded.data.laps, &loaded.stints)
        .into_iter()
        .filter(|d| args.includes(d))
        .collect();

    match ctx.format {
        OutputFormat::Json => {
            let report = StintReport {
                stints: shown,
                no_tire_data,
            };
            println!("{}", json::format_session_json(&report, &loaded)?);
        }
        OutputFormat::Table => {
            let rows: Vec<StintDisplay> = shown.into_iter().map(StintDisplay::from).collect();
            println!("{}", table::format_table(&rows));
        }
        OutputFormat::Pretty => {
            print_header(&loaded);
            print_stint_strips(&shown);
            if !no_tire_data.is_empty() {
                println!("{} {}", "No tire data:".dimmed(), no_tire_data.join(", "));
            }
        }
    }

    Ok(())
}

/// One line per driver: each stint as a colored compound with its lap range.
fn print_stint_strips(stints: &[&Stint]) {
    if stints.is_empty() {
        println!("No results found.");
        return;
    }

    let mut start = 0;
    while start < stints.len() {
        let driver = &stints[start].driver;
        let end = stints[start..]
            .iter()
            .position(|s| &s.driver != driver)
            .map_or(stints.len(), |offset| start + offset);

        let strip: Vec<String> = stints[start..end]
            .iter()
            .map(|s| {
                let range = match s.end_lap {
                    Some(end) => format!("{}-{}", s.start_lap, end),
                    None => format!("{}-", s.start_lap),
                };
                format!("{} {}", compound_label(s.compound), range)
            })
            .collect();
        println!("{:<4} {}", driver.bold(), strip.join("  │  "));

        start = end;
    }
}

fn compound_label(compound: Option<Compound>) -> ColoredString {
    let label = or_dash(compound);
    match compound {
        Some(Compound::HyperSoft | Compound::UltraSoft | Compound::SuperSoft) => label.magenta(),
        Some(Compound::Soft) => label.red(),
        Some(Compound::Medium) => label.yellow(),
        Some(Compound::Hard | Compound::SuperHard) => label.white().bold(),
        Some(Compound::Intermediate) => label.green(),
        Some(Compound::Wet) => label.blue(),
        Some(Compound::Unknown) | None => label.dimmed(),
    }
}

fn print_header(loaded: &LoadedSession) {
    let cached = if loaded.fully_cached() {
        " (cached)".dimmed().to_string()
    } else {
        String::new()
    };
    println!("{}{}", loaded.id.to_string().bold(), cached);
}

/// Run the pits command
pub async fn pits(opts: &GlobalOptions, args: &SessionArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let loaded = ctx.load(args).await?;

    let mut stops: Vec<&PitStop> = loaded
        .pit_stops
        .iter()
        .filter(|p| args.includes(&p.driver))
        .collect();
    stops.sort_by_key(|p| p.lap);

    let stints: Vec<&Stint> = loaded
        .stints
        .iter()
        .filter(|s| args.includes(&s.driver))
        .collect();
    let summary = strategy_summary(&stints, &stops);

    match ctx.format {
        OutputFormat::Json => {
            let report = PitReport { stops, summary };
            println!("{}", json::format_session_json(&report, &loaded)?);
        }
        OutputFormat::Table => {
            let rows: Vec<PitStopDisplay> = stops.into_iter().map(PitStopDisplay::from).collect();
            println!("{}", table::format_table(&rows));
            if summary.drivers() > 0 {
                println!("{}", table::format_pairs(&strategy_pairs(&summary)));
            }
        }
        OutputFormat::Pretty => {
            print_header(&loaded);
            if stops.is_empty() {
                println!("No pit stops.");
            }
            for stop in stops {
                println!(
                    "Lap {:>3}  {:<4} {} → {}",
                    stop.lap,
                    stop.driver.bold(),
                    compound_label(stop.from_compound),
                    compound_label(stop.to_compound)
                );
            }
            if summary.drivers() > 0 {
                println!();
                for (label, value) in strategy_pairs(&summary) {
                    println!("{} {}", format!("{}:", label).dimmed(), value);
                }
            }
        }
    }

    Ok(())
}

fn strategy_pairs(summary: &StrategySummary) -> Vec<(&'static str, String)> {
    let total = summary.drivers();
    let stops = summary
        .stops_per_driver
        .iter()
        .map(|d| format!("{} {}", d.driver, d.stops))
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        ("One-stop", format!("{}/{} drivers", summary.one_stop, total)),
        ("Two-stop", format!("{}/{} drivers", summary.two_stop, total)),
        (
            "Main pit window",
            summary
                .main_window
                .map(|w| {
                    let noun = if w.drivers == 1 { "driver" } else { "drivers" };
                    format!("Lap {} ({} {})", w.lap, w.drivers, noun)
                })
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Stops per driver", stops),
    ]
}

/// Run the pace command
///
/// Race and sprint pace is compared against the event's qualifying session
/// when it can be loaded.
pub async fn pace(opts: &GlobalOptions, args: &SessionArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let loaded = ctx.load(args).await?;

    let qualifying = if matches!(args.session, SessionType::Race | SessionType::Sprint) {
        let quali_args = SessionArgs {
            session: SessionType::Qualifying,
            ..args.clone()
        };
        match ctx.load(&quali_args).await {
            Ok(quali) => Some(quali),
            Err(e) => {
                log::warn!("Skipping qualifying comparison: {}", e);
                None
            }
        }
    } else {
        None
    };

    let paces: Vec<DriverPace> = driver_pace(&loaded.data, qualifying.as_ref().map(|q| &q.data))
        .into_iter()
        .filter(|p| args.includes(&p.driver))
        .collect();

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", json::format_session_json(&paces, &loaded)?);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            if ctx.format == OutputFormat::Pretty {
                print_header(&loaded);
            }
            let rows: Vec<PaceDisplay> = paces.iter().map(PaceDisplay::from).collect();
            println!("{}", table::format_table(&rows));
        }
    }

    Ok(())
}
