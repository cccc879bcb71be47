//! Demo binary: drives a craps session at the terminal through the same
//! collaborator traits a chat surface would use.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::info;

use chatcraps::{
    BetType, Decision, EconomicLedger, InMemoryLedger, LifecycleConfig, PresentationChannel,
    RandomRoller, Result, SessionManager, TableUpdate,
};

#[derive(Parser)]
#[command(name = "chatcraps", about = "Craps wagering engine demo table")]
struct Cli {
    /// Starting chip balance
    #[arg(long, default_value_t = 10_000)]
    chips: u64,

    /// Seed the dice for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Print raw update JSON instead of the text table
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted demo session
    Demo {
        /// Pass line wager ("500", "5k", "half", "all")
        #[arg(long, default_value = "500")]
        wager: String,
        /// Number of rolls before walking away
        #[arg(long, default_value_t = 10)]
        rolls: u32,
    },
    /// Drive the table interactively from stdin
    Play {
        #[arg(long, default_value = "500")]
        wager: String,
    },
}

/// Prints every update the way a chat surface would render it
struct ConsoleChannel {
    json: bool,
}

#[async_trait]
impl PresentationChannel for ConsoleChannel {
    async fn render(&self, update: TableUpdate) {
        if self.json {
            match serde_json::to_string(&update) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("render error: {err}"),
            }
            return;
        }
        let snapshot = &update.snapshot;
        println!();
        println!("{}", snapshot.layout());
        if let Some(roll) = &snapshot.last_roll {
            println!("Roll: {roll}");
        }
        for line in &snapshot.narrative {
            println!("  {line}");
        }
        let profit = snapshot.session_profit;
        println!(
            "Session {}: {}",
            if profit >= 0 { "profit" } else { "loss" },
            chatcraps::utils::format_chips(profit.abs())
        );
    }
}

const PLAYER: chatcraps::PlayerId = 1;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let economy = Arc::new(InMemoryLedger::new());
    economy.credit(PLAYER, cli.chips);
    let manager = SessionManager::new(
        Arc::clone(&economy) as Arc<dyn EconomicLedger>,
        Arc::new(ConsoleChannel { json: cli.json }),
        LifecycleConfig::default(),
    );

    let roller = match cli.seed {
        Some(seed) => Box::new(RandomRoller::seeded(seed)),
        None => Box::new(RandomRoller::new()),
    };

    match cli.command {
        Commands::Demo { wager, rolls } => {
            let wager = chatcraps::utils::parse_wager(&wager, cli.chips)?;
            manager.start_session_with_roller(PLAYER, wager, roller).await?;
            run_demo(&manager, rolls).await?;
        }
        Commands::Play { wager } => {
            let wager = chatcraps::utils::parse_wager(&wager, cli.chips)?;
            manager.start_session_with_roller(PLAYER, wager, roller).await?;
            run_interactive(&manager, &economy).await?;
        }
    }

    info!(balance = economy.balance(PLAYER).await?, "walked away from the table");
    Ok(())
}

/// Roll a fixed number of times, keeping every winning bet up and adding a
/// field bet whenever the slot is free.
async fn run_demo(manager: &SessionManager, rolls: u32) -> Result<()> {
    for _ in 0..rolls {
        let snapshot = manager.snapshot(PLAYER).await?;
        if snapshot.actions.placeable.contains(&BetType::Field) {
            // a modest side bet; rejection just means the chips ran out
            let _ = manager.place_bet(PLAYER, BetType::Field, 50).await;
        }
        for bet_type in manager.snapshot(PLAYER).await?.actions.decidable {
            manager.decide(PLAYER, bet_type, Decision::Keep).await?;
        }
        let (outcome, _) = manager.roll(PLAYER).await?;
        if outcome.seven_out {
            return Ok(());
        }
    }
    println!("\nWalked away with the table still live.");
    Ok(())
}

async fn run_interactive(manager: &SessionManager, economy: &Arc<InMemoryLedger>) -> Result<()> {
    println!("Commands: roll | bet <type> <amount> | keep <type> | take <type> | resume | table | quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            return Ok(());
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let result = match parts.as_slice() {
            ["roll"] => manager.roll(PLAYER).await.map(|_| ()),
            ["bet", bet_type, amount] => {
                match (bet_type.parse::<BetType>(), economy.balance(PLAYER).await) {
                    (Ok(bet_type), Ok(balance)) => {
                        match chatcraps::utils::parse_wager(amount, balance) {
                            Ok(amount) => {
                                manager.place_bet(PLAYER, bet_type, amount).await.map(|_| ())
                            }
                            Err(err) => Err(err),
                        }
                    }
                    (Err(err), _) => Err(err),
                    (_, Err(err)) => Err(err),
                }
            }
            ["keep", bet_type] => match bet_type.parse::<BetType>() {
                Ok(bet_type) => manager.decide(PLAYER, bet_type, Decision::Keep).await.map(|_| ()),
                Err(err) => Err(err),
            },
            ["take", bet_type] => match bet_type.parse::<BetType>() {
                Ok(bet_type) => manager
                    .decide(PLAYER, bet_type, Decision::TakeDown)
                    .await
                    .map(|_| ()),
                Err(err) => Err(err),
            },
            ["resume"] => manager.resume(PLAYER).await.map(|_| ()),
            ["table"] => {
                match manager.snapshot(PLAYER).await {
                    Ok(snapshot) => {
                        println!("{}", snapshot.layout());
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            ["quit"] | ["exit"] => return Ok(()),
            [] => continue,
            _ => {
                println!("unrecognized command");
                continue;
            }
        };
        if let Err(err) = result {
            println!("rejected: {err}");
            if matches!(err, chatcraps::Error::SessionNotFound) {
                return Ok(());
            }
        }
    }
}
