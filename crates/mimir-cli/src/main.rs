//! Mimir - play a tabletop campaign with an LLM Dungeon Master that remembers

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mimir::config::Config;
use mimir::session::{Character, Session};
use mimir_cli::commands::Command;
use mimir_cli::error::CliResult;
use mimir_cli::output::{OutputFormat, print_help, print_memory, print_saved};

/// Mimir - an LLM Dungeon Master with short-term and long-term memory
#[derive(Parser)]
#[command(name = "mimir")]
#[command(about = "An LLM Dungeon Master with short-term and long-term memory")]
#[command(version)]
pub struct Cli {
    #[clap(long, short = 'c', help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(long, help = "Full name of your character")]
    pub name: Option<String>,

    #[clap(long, help = "What your friends call your character")]
    pub nick: Option<String>,

    #[clap(long, short, help = "Directory that :w writes memory files into")]
    pub out_dir: Option<PathBuf>,

    #[clap(long, short, help = "Print memory dumps as JSON")]
    pub json: bool,
}

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.out_dir {
        config.session.output_dir = dir;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let default_name = config.session.default_character.clone();

    let name = match cli.name {
        Some(name) => name,
        None => ask(&mut lines, &format!("Character name [{default_name}]: ")).await?,
    };
    let shown_name = if name.trim().is_empty() {
        default_name.as_str()
    } else {
        name.trim()
    };
    let nick = match cli.nick {
        Some(nick) => nick,
        None => ask(&mut lines, &format!("Nickname [{shown_name}]: ")).await?,
    };

    let character = Character::new(&name, &nick, &default_name);
    let session = Session::from_config(config, character)?;
    let nick = session.character().nick.clone();
    let dm = session.ai_prefix().to_string();

    let (line, reply) = session.introduce().await?;
    println!("{nick}: {line}");
    println!("{dm}: {reply}\n");
    print_help();

    loop {
        prompt(&format!("\n{nick}> "))?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Memory => {
                let snapshot = session.snapshot().await;
                print_memory(&snapshot, &nick, &dm, format)?;
            }
            Command::Save => match session.persist(None).await {
                Ok(files) => print_saved(&files, format)?,
                Err(e) => eprintln!("Error: {e}"),
            },
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Say(text) => match session.say(&text).await {
                Ok(reply) => println!("{dm}: {reply}"),
                Err(e) => {
                    warn!("Turn failed: {e}");
                    eprintln!("Error: {e}");
                }
            },
        }
    }

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,mimir=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn prompt(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

/// Read one answer; end of input counts as an empty answer
async fn ask(lines: &mut InputLines, question: &str) -> CliResult<String> {
    prompt(question)?;
    Ok(lines.next_line().await?.unwrap_or_default())
}
