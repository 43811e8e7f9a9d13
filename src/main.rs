//! Dominion - Entry Point
//!
//! Interactive driver for the faction simulation: seeds a small world,
//! then accepts commands to tick the engine, inspect factions, and
//! save or load snapshots.

use clap::Parser;

use dominion::core::config::SimulationConfig;
use dominion::core::error::Result;
use dominion::core::types::FactionId;
use dominion::facade::WorldFacade;
use dominion::faction::faction::{FactionValue, ValueKind};
use dominion::faction::goal::{GoalKind, GoalTarget};
use dominion::world::resource::{Rarity, ResourceKind};
use dominion::world::territory::TerritoryKind;

use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "dominion", about = "Autonomous faction simulation")]
struct Args {
    /// World seed for deterministic runs
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Run this many ticks and print a summary instead of going interactive
    #[arg(long)]
    ticks: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("dominion=info")
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };

    tracing::info!("Dominion starting with seed {}", args.seed);

    let mut facade = WorldFacade::new(config, args.seed);
    spawn_demo_world(&facade);

    if let Some(ticks) = args.ticks {
        for _ in 0..ticks {
            facade.tick();
        }
        print_status(&facade);
        return Ok(());
    }

    println!("\n=== DOMINION ===");
    println!("Factions pursuing goals, trading, and scheming over territory");
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance simulation by one tick");
    println!("  run <n>         - Run n simulation ticks");
    println!("  status / s      - Show world status");
    println!("  report <name>   - Show a faction's report");
    println!("  start <mult>    - Drive ticks in real time, sped up <mult>x");
    println!("  stop            - Halt the real-time driver");
    println!("  save <file>     - Write a world snapshot");
    println!("  load <file>     - Restore a world snapshot");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            facade.tick();
            print_status(&facade);
        } else if let Some(n) = input.strip_prefix("run ") {
            match n.trim().parse::<u64>() {
                Ok(n) => {
                    for _ in 0..n {
                        facade.tick();
                    }
                    print_status(&facade);
                }
                Err(_) => println!("Usage: run <n>"),
            }
        } else if input == "status" || input == "s" {
            print_status(&facade);
        } else if let Some(name) = input.strip_prefix("report ") {
            print_report(&facade, name.trim());
        } else if let Some(mult) = input.strip_prefix("start ") {
            match mult.trim().parse::<f64>() {
                Ok(mult) => {
                    if facade.start_simulation(mult) {
                        println!("Driver running at {}x", mult);
                    } else {
                        println!("Already running, or multiplier not positive");
                    }
                }
                Err(_) => println!("Usage: start <multiplier>"),
            }
        } else if input == "stop" {
            if facade.stop_simulation() {
                print_status(&facade);
            } else {
                println!("Nothing running");
            }
        } else if let Some(path) = input.strip_prefix("save ") {
            match facade.serialize_state() {
                Ok(json) => {
                    std::fs::write(path.trim(), json)?;
                    println!("Saved to {}", path.trim());
                }
                Err(err) => println!("Save failed: {}", err),
            }
        } else if let Some(path) = input.strip_prefix("load ") {
            match std::fs::read_to_string(path.trim()) {
                Ok(json) => {
                    if facade.deserialize_state(&json) {
                        println!("World restored");
                    } else {
                        println!("Snapshot rejected");
                    }
                }
                Err(err) => println!("Load failed: {}", err),
            }
        } else {
            println!("Unknown command: {}", input);
        }
    }

    Ok(())
}

/// A small starting world: three factions with clashing values and a
/// contested mountain pass
fn spawn_demo_world(facade: &WorldFacade) {
    let ravens = facade
        .create_faction(
            "Raven Compact",
            vec![
                FactionValue::new(ValueKind::Knowledge, 70.0),
                FactionValue::new(ValueKind::Order, 40.0),
            ],
            None,
        )
        .expect("engine lock");
    let boars = facade
        .create_faction(
            "Boar Clans",
            vec![
                FactionValue::new(ValueKind::Power, 60.0),
                FactionValue::new(ValueKind::Order, -30.0),
            ],
            None,
        )
        .expect("engine lock");
    let gulls = facade
        .create_faction(
            "Gull Syndicate",
            vec![
                FactionValue::new(ValueKind::Wealth, 80.0),
                FactionValue::new(ValueKind::Freedom, 50.0),
            ],
            None,
        )
        .expect("engine lock");

    let pass = facade
        .create_territory("Graystone Pass", TerritoryKind::Fortress, 85.0, 30.0)
        .expect("engine lock");
    let port = facade
        .create_territory("Saltmere Port", TerritoryKind::City, 50.0, 90.0)
        .expect("engine lock");
    let woods = facade
        .create_territory("Thornwood", TerritoryKind::Wilderness, 25.0, 40.0)
        .expect("engine lock");
    facade.link_territories(pass, woods);
    facade.link_territories(port, woods);

    facade.create_resource("Iron Vein", ResourceKind::Ore, Rarity::Uncommon, 500.0, 4.0, Some(pass));
    facade.create_resource("Fish Stocks", ResourceKind::Food, Rarity::Common, 2000.0, 0.5, Some(port));

    facade.assign_territory_to_faction(port, gulls);
    facade.assign_territory_to_faction(woods, ravens);

    // Both land powers want the same pass: a slow-burning rivalry
    facade.set_faction_goal(
        ravens,
        GoalKind::Territory,
        "Secure Graystone Pass",
        "The pass controls the northern trade road",
        8.0,
        Some(GoalTarget::Territory(pass)),
    );
    facade.set_faction_goal(
        boars,
        GoalKind::Territory,
        "Take Graystone Pass",
        "The clans need the pass for the winter migrations",
        9.0,
        Some(GoalTarget::Territory(pass)),
    );
    facade.set_faction_goal(
        gulls,
        GoalKind::Wealth,
        "Corner the fish trade",
        "Own every net from Saltmere to the cape",
        6.0,
        None,
    );
}

fn print_status(facade: &WorldFacade) {
    let snapshot = match facade.world_state() {
        Some(snapshot) => snapshot,
        None => return,
    };

    println!("\n--- tick {} (t={}ms) ---", snapshot.ticks, snapshot.now.0);
    for faction in snapshot.factions.all() {
        let s = faction.state;
        println!(
            "{:<16} pow {:>5.1}  wlt {:>5.1}  coh {:>5.1}  inf {:>5.1}  terr {}  goals {}",
            faction.name,
            s.power,
            s.wealth,
            s.cohesion,
            s.influence,
            faction.territories.len(),
            faction.goals.len(),
        );
    }
    for rel in snapshot.factions.relationships() {
        let a = snapshot.factions.get(rel.pair.0).map(|f| f.name.as_str()).unwrap_or("?");
        let b = snapshot.factions.get(rel.pair.1).map(|f| f.name.as_str()).unwrap_or("?");
        println!(
            "  {} <-> {}: {:>6.1} ({:?})",
            a,
            b,
            rel.attitude(),
            rel.status
        );
    }
}

fn print_report(facade: &WorldFacade, name: &str) {
    let snapshot = match facade.world_state() {
        Some(snapshot) => snapshot,
        None => return,
    };
    let id: Option<FactionId> = snapshot.factions.get_by_name(name).map(|f| f.id);
    let report = match id.and_then(|id| facade.faction_report(id)) {
        Some(report) => report,
        None => {
            println!("No faction named '{}'", name);
            return;
        }
    };

    println!("\n=== {} ===", report.faction.name);
    println!("state: {:?}", report.faction.state);
    println!("territories: {}", report.territories.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", "));
    println!("allies: {:?}  enemies: {:?}", report.allies, report.enemies);
    for goal in &report.goals {
        println!("goal [{:>5.1}%] {}", goal.progress(), goal.title);
    }
    for action in &report.recent_actions {
        println!("  {:>8} {:?}: {}", action.at.0, action.kind, action.description);
    }
}
