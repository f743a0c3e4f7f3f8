use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use ussd_flow::prelude::*;

/// Replay and inspect USSD screen definitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional path to an engine configuration JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a screens file and report its flows
    Check {
        /// Path to the screens JSON file
        screens_path: String,
    },
    /// Replay an accumulated input string and print the rendered reply
    Run {
        /// Path to the screens JSON file
        screens_path: String,
        /// Accumulated input, e.g. "1*2*0712345678"
        #[arg(short, long, default_value = "")]
        text: String,
        /// Flow to replay (defaults to the configured default flow)
        #[arg(short, long)]
        flow: Option<String>,
        #[arg(long, default_value = "cli-session")]
        session_id: String,
        #[arg(long, default_value = "+000000000000")]
        phone: String,
        /// Run the callback of the exited screen (HTTP callbacks only)
        #[arg(long)]
        dispatch: bool,
    },
    /// Walk through a session interactively, one input per prompt
    Simulate {
        /// Path to the screens JSON file
        screens_path: String,
        #[arg(short, long)]
        flow: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Check { screens_path } => run_check(&screens_path),
        Command::Run {
            screens_path,
            text,
            flow,
            session_id,
            phone,
            dispatch,
        } => {
            let engine = load_engine(&screens_path, config);
            let flow = flow.unwrap_or_else(|| engine.config().default_flow.clone());
            run_replay(&engine, &flow, &text, &session_id, &phone, dispatch).await;
        }
        Command::Simulate { screens_path, flow } => {
            let engine = load_engine(&screens_path, config);
            let flow = flow.unwrap_or_else(|| engine.config().default_flow.clone());
            run_interactive(&engine, &flow);
        }
    }
}

fn load_engine(screens_path: &str, config: EngineConfig) -> UssdFlow {
    let store = ScreenStore::from_file(screens_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load screens: {}", e)));
    UssdFlow::builder(store)
        .with_config(config)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build engine: {}", e)))
}

fn run_check(screens_path: &str) {
    let load_start = Instant::now();
    let store = ScreenStore::from_file(screens_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load screens: {}", e)));
    let load_duration = load_start.elapsed();

    println!("Loaded '{}' in {:?}", screens_path, load_duration);
    for flow in store.flows() {
        let callbacks = flow
            .screens()
            .iter()
            .filter(|screen| screen.callback.is_some())
            .count();
        println!(
            "  -> Flow '{}': {} screens, {} with callbacks",
            flow.name(),
            flow.screens().len(),
            callbacks
        );
        for screen in flow.screens() {
            if let ScreenType::Unsupported(type_name) = &screen.screen_type {
                println!(
                    "     ! Screen '{}' has unsupported type '{}'",
                    screen.name, type_name
                );
            }
        }
    }
}

async fn run_replay(
    engine: &UssdFlow,
    flow: &str,
    text: &str,
    session_id: &str,
    phone: &str,
    dispatch: bool,
) {
    let start = Instant::now();

    if !dispatch {
        let resolution = engine
            .resolve(flow, text)
            .unwrap_or_else(|e| exit_with_error(&format!("Replay failed: {}", e)));
        println!(
            "Previous: {}",
            resolution.previous.map_or("-", |s| s.name.as_str())
        );
        println!(
            "Current:  {}.{} ({:?})",
            resolution.flow.name(),
            resolution.current.name,
            resolution.outcome
        );
        let body = engine
            .preview(flow, text)
            .unwrap_or_else(|e| exit_with_error(&format!("Render failed: {}", e)));
        println!("\n{}", body);
    } else {
        let request = UssdRequest {
            phone_number: phone.to_string(),
            session_id: session_id.to_string(),
            service_code: String::new(),
            text: text.to_string(),
        };
        let reply = engine
            .handle_flow(flow, &request)
            .await
            .unwrap_or_else(|e| exit_with_error(&format!("Request failed: {}", e)));
        match reply.dispatch {
            Some(Dispatch::Completed(outcome)) => println!("Callback: {:?}", outcome),
            Some(Dispatch::Detached(ticket)) => {
                println!("Callback '{}' started in background", ticket.label());
                ticket.wait().await;
            }
            Some(Dispatch::Dropped { callback }) => {
                println!("Callback '{}' dropped, pool is saturated", callback)
            }
            None => println!("Callback: none"),
        }
        println!("\n{}", reply.body);
    }

    println!("\nReplayed in {:?}", start.elapsed());
}

/// Prompts for one input at a time, replaying the accumulated text after
/// each answer until an END screen is reached.
fn run_interactive(engine: &UssdFlow, flow: &str) {
    println!("--- USSD Session Simulator (flow '{}') ---", flow);
    let delimiter = engine.config().delimiter;
    let mut inputs: Vec<String> = Vec::new();

    loop {
        let text = inputs.join(&delimiter.to_string());
        let body = engine
            .preview(flow, &text)
            .unwrap_or_else(|e| exit_with_error(&format!("Replay failed: {}", e)));
        println!("\n{}", body);

        if body.starts_with(ussd_flow::render::END) {
            break;
        }
        match prompt_for_input("Reply") {
            Some(input) => inputs.push(input),
            None => break,
        }
    }
}

/// Reads one trimmed line. Returns `None` once stdin is closed.
fn prompt_for_input(prompt_text: &str) -> Option<String> {
    let mut line = String::new();

    print!("> {}: ", prompt_text);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to flush stdout: {}", e));
    }
    match io::stdin().read_line(&mut line) {
        Ok(0) => {
            println!();
            None
        }
        Ok(_) => Some(line.trim().to_string()),
        Err(e) => exit_with_error(&format!("Failed to read line: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
