use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use csv_geocode_picker::commands::config::{get_config, reset_config, update_config};
use csv_geocode_picker::commands::import::{load_file, preview_import_data};
use csv_geocode_picker::commands::submit::{
    geocode_file, submit_and_wait, wait_for_load, GeocodeRequest, GeocodeSummary,
};
use csv_geocode_picker::utils::file_utils::is_supported_file;
use csv_geocode_picker::utils::logging::init_tracing;
use csv_geocode_picker::{AppConfig, AppState, DetachedPresenter, PickerSnapshot};

#[derive(Parser)]
#[command(name = "csvgeocode")]
#[command(about = "Pick address columns of a CSV file and send it to a geocoder")]
#[command(version)]
pub struct Cli {
    #[arg(long, short, global = true, help = "Log debug output to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the detected delimiter, headers and first rows")]
    Preview {
        #[arg(help = "Path to the CSV file")]
        file: String,
        #[arg(long, default_value_t = 10, help = "Number of rows to show")]
        rows: usize,
    },
    #[command(about = "Submit a file with the given columns and save the answer")]
    Submit {
        #[arg(help = "Path to the CSV file")]
        file: String,
        #[arg(
            long = "column",
            short = 'c',
            help = "Column to send, repeat in the order they should be sent"
        )]
        columns: Vec<String>,
        #[arg(long, help = "Require every chosen column to match")]
        match_all: bool,
        #[command(flatten)]
        target: TargetArgs,
    },
    #[command(about = "Pick columns one command at a time")]
    Interactive {
        #[arg(help = "Path to the CSV file")]
        file: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    #[command(about = "Print or change the stored configuration")]
    Config {
        #[arg(long, help = "Restore the default configuration first")]
        reset: bool,
        #[arg(long, value_name = "URL", help = "Store a new page URL")]
        page_url: Option<String>,
        #[arg(long, value_name = "URL", help = "Store a new POST target")]
        post_url: Option<String>,
    },
}

#[derive(clap::Args)]
struct TargetArgs {
    #[arg(long, value_name = "URL", help = "POST target, relative to the configured page URL")]
    endpoint: Option<String>,
    #[arg(long, value_name = "DIR", help = "Directory for received documents")]
    output: Option<String>,
    #[arg(long, help = "Print the received document instead of saving it")]
    stdout: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose.then_some("debug"));

    let result = match cli.command {
        Commands::Preview { file, rows } => run_preview(file, rows).await,
        Commands::Submit {
            file,
            columns,
            match_all,
            target,
        } => run_submit(file, columns, match_all, target).await,
        Commands::Interactive { file, target } => run_interactive(file, target).await,
        Commands::Config {
            reset,
            page_url,
            post_url,
        } => run_config(reset, page_url, post_url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn check_file(file: &str) -> Result<()> {
    if !Path::new(file).is_file() {
        bail!("File not found: {}", file);
    }
    if !is_supported_file(file) {
        warn!("{} does not have a CSV extension", file);
    }
    Ok(())
}

fn start_state(target: &TargetArgs) -> Result<AppState> {
    let mut config: AppConfig = AppState::load_config();
    if let Some(endpoint) = &target.endpoint {
        config.submit.post_url = Some(endpoint.clone());
    }
    if let Some(output) = &target.output {
        config.output.directory = output.clone();
    }
    info!("Using endpoint {}", config.endpoint()?);

    if target.stdout {
        AppState::with_presenter(config, Arc::new(DetachedPresenter))
    } else {
        AppState::from_config(config)
    }
}

async fn run_config(
    reset: bool,
    page_url: Option<String>,
    post_url: Option<String>,
) -> Result<()> {
    let state = AppState::new()?;
    if reset {
        reset_config(&state).await.map_err(anyhow::Error::msg)?;
    }
    if page_url.is_some() || post_url.is_some() {
        let mut config = get_config(&state).await.map_err(anyhow::Error::msg)?;
        if let Some(page_url) = page_url {
            config.submit.page_url = page_url;
        }
        if post_url.is_some() {
            config.submit.post_url = post_url;
        }
        update_config(&state, config)
            .await
            .map_err(anyhow::Error::msg)?;
    }

    let config = get_config(&state).await.map_err(anyhow::Error::msg)?;
    println!("{}", config.export()?);
    println!("Stored at {}", AppConfig::get_config_path()?.display());
    Ok(())
}

async fn run_preview(file: String, rows: usize) -> Result<()> {
    check_file(&file)?;
    let preview = preview_import_data(file, Some(rows))
        .await
        .map_err(anyhow::Error::msg)?;

    match preview.delimiter {
        Some(delimiter) => println!("Delimiter: {:?}", delimiter),
        None => println!("Delimiter: none (the file cannot be submitted)"),
    }
    println!("Encoding:  {}", preview.encoding);
    println!("Rows:      {}", preview.total_rows);
    println!("Columns:");
    for header in &preview.headers {
        println!("  {}", header);
    }
    for row in &preview.rows {
        println!("| {}", row.join(" | "));
    }
    Ok(())
}

async fn run_submit(
    file: String,
    columns: Vec<String>,
    match_all: bool,
    target: TargetArgs,
) -> Result<()> {
    check_file(&file)?;
    let state = start_state(&target)?;
    let summary = geocode_file(
        &state,
        GeocodeRequest {
            file_path: file,
            columns,
            match_all,
        },
    )
    .await
    .map_err(anyhow::Error::msg)?;

    report(&summary);
    Ok(())
}

fn report(summary: &GeocodeSummary) {
    match &summary.location {
        Some(location) => println!("Saved geocoded CSV to {}", location),
        None => print!("{}", summary.document.content),
    }
}

const HELP: &str = "\
commands:
  list                      show both column lists
  toggle <column>           move a column to the other list
  choose <column>           append a column to the chosen list
  move <column> before <c>  insert a column before another one
  match-all on|off          require every chosen column to match
  load <file>               replace the current file
  submit                    send the file and wait for the answer
  quit";

async fn run_interactive(file: String, target: TargetArgs) -> Result<()> {
    check_file(&file)?;
    let state = start_state(&target)?;
    load_and_wait(&state, &file).await?;
    print_snapshot(&state.picker.snapshot().await?);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
        let argument = argument.trim();

        let outcome: Result<()> = match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "list" => Ok(()),
            "toggle" => state.picker.toggle_column(argument).await.map_err(Into::into),
            "choose" => state.picker.drop_on_chosen(argument).await.map_err(Into::into),
            "move" => match argument.split_once(" before ") {
                Some((dragged, target)) => state
                    .picker
                    .drop_on_item(dragged.trim(), target.trim())
                    .await
                    .map_err(Into::into),
                None => Err(anyhow::anyhow!("usage: move <column> before <column>")),
            },
            "match-all" => match argument {
                "on" | "true" => state.picker.set_match_all(true).await.map_err(Into::into),
                "off" | "false" => state.picker.set_match_all(false).await.map_err(Into::into),
                _ => Err(anyhow::anyhow!("usage: match-all on|off")),
            },
            "load" => load_and_wait(&state, argument).await,
            "submit" => submit_and_wait(&state)
                .await
                .map(|summary| report(&summary))
                .map_err(anyhow::Error::msg),
            other => Err(anyhow::anyhow!("unknown command {:?}, try help", other)),
        };

        match outcome {
            Ok(()) => print_snapshot(&state.picker.snapshot().await?),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }
    Ok(())
}

async fn load_and_wait(state: &AppState, file: &str) -> Result<()> {
    let timeout = state.wait_timeout().await;
    let mut events = state.picker.subscribe();
    load_file(state, file.to_string())
        .await
        .map_err(anyhow::Error::msg)?;
    wait_for_load(&mut events, timeout).await?;
    Ok(())
}

fn print_snapshot(snapshot: &PickerSnapshot) {
    if let Some(file_name) = &snapshot.file_name {
        println!("file:      {} ({:?})", file_name, snapshot.phase);
    }
    println!("available: {}", snapshot.available.join(", "));
    println!("chosen:    {}", snapshot.chosen.join(", "));
    println!(
        "match all: {}  submit: {}",
        snapshot.match_all,
        if snapshot.submit_enabled { "enabled" } else { "disabled" }
    );
}
