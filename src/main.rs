//! Console front end for the counseling orchestrator.
//!
//! Collects the intake answers, then relays each message to the
//! orchestrator until the user types `exit` or closes input.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use counsel_swarm::application::{build_orchestrator, CounselingOrchestrator, TurnCommand};
use counsel_swarm::config::{AppConfig, LogFormat};
use counsel_swarm::domain::counseling::{IntakeForm, TurnKind};
use counsel_swarm::domain::foundation::SessionId;

type Input = Lines<BufReader<Stdin>>;

#[derive(Parser)]
#[command(name = "counsel-swarm")]
#[command(about = "Relationship counseling with a panel of expert agents", long_about = None)]
struct Cli {
    /// Resume (or start) a session with this id instead of a fresh one
    #[arg(long)]
    session: Option<String>,

    /// Delete the stored session and exit
    #[arg(long, requires = "session")]
    purge: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Console session aborted");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = build_orchestrator(config).await?;
    let session_id = match cli.session {
        Some(id) => SessionId::new(id)?,
        None => SessionId::generate(),
    };

    if cli.purge {
        orchestrator.purge(&session_id).await?;
        println!("Session {} deleted.", session_id);
        return Ok(());
    }

    let mut input = BufReader::new(stdin()).lines();
    let resuming =
        orchestrator.get_state(&session_id).await?.turn_kind() == TurnKind::SubsequentTurn;

    println!("{}", "=".repeat(50));
    println!("Welcome to the AI Relationship Counselor 'Dr. Helen'.");
    let mut profile = None;
    if resuming {
        println!("Resuming your previous session.");
    } else {
        println!("To begin, please provide some initial information.");
        println!("{}", "=".repeat(50));
        match intake(&mut input).await? {
            Some(form) => profile = Some(form.into_profile()?),
            None => return Ok(()),
        }
        println!("\nThank you for sharing. Now, let's start the session.");
    }

    println!("{}", "=".repeat(50));
    println!("(Session ID: {})", session_id);
    println!("Type 'exit' to end the conversation.");
    println!("{}", "=".repeat(50));

    converse(&orchestrator, &session_id, profile, &mut input).await?;
    println!("\nCounseling session ended. Please feel free to return anytime.");
    Ok(())
}

async fn converse(
    orchestrator: &CounselingOrchestrator,
    session_id: &SessionId,
    mut profile: Option<counsel_swarm::domain::counseling::UserProfile>,
    input: &mut Input,
) -> std::io::Result<()> {
    loop {
        let Some(message) = ask(input, "\nYou: ").await? else {
            return Ok(());
        };
        let message = message.trim();
        if message.eq_ignore_ascii_case("exit") {
            return Ok(());
        }
        if message.is_empty() {
            continue;
        }

        let mut cmd = TurnCommand::new(session_id.clone(), message);
        if let Some(profile) = profile.clone() {
            cmd = cmd.with_profile(profile);
        }

        match orchestrator.handle_turn(cmd).await {
            Ok(result) => {
                // The profile is stored once the first turn succeeds.
                profile = None;
                if result.phase_changed {
                    println!("\n[Counseling phase: {}]", result.phase);
                }
                println!("\n\x1b[94mDr. Helen:\x1b[0m {}", result.reply);
            }
            Err(err) => println!("\n{}", err.user_message()),
        }
    }
}

async fn intake(input: &mut Input) -> std::io::Result<Option<IntakeForm>> {
    let Some(relationship_duration) = ask(
        input,
        "1. How long have you been married? (e.g., 5 years, 6 months): ",
    )
    .await?
    else {
        return Ok(None);
    };
    let Some(main_conflict) = ask(
        input,
        "2. Briefly, what is the main source of conflict you are facing?: ",
    )
    .await?
    else {
        return Ok(None);
    };
    let Some(tendency) = ask(
        input,
        "3. When a conflict arises, what is your typical reaction? (e.g., I try to talk it out, I need some space): ",
    )
    .await?
    else {
        return Ok(None);
    };

    let emotional_rational_index = loop {
        let Some(raw) = ask(
            input,
            "4. On a scale of 1 (very emotional) to 10 (very rational), how would you describe your response style?: ",
        )
        .await?
        else {
            return Ok(None);
        };
        match IntakeForm::parse_index(&raw) {
            Ok(index) => break index,
            Err(_) => println!("Invalid input. Please enter a whole number between 1 and 10."),
        }
    };

    Ok(Some(IntakeForm {
        relationship_duration: relationship_duration.trim().to_string(),
        main_conflict: main_conflict.trim().to_string(),
        tendency: tendency.trim().to_string(),
        emotional_rational_index,
    }))
}

/// Prints `prompt` and reads one line. `None` on end of input.
async fn ask(input: &mut Input, prompt: &str) -> std::io::Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    input.next_line().await
}
