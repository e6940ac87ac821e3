//! `hive` - CLI for the Hive Archives
//!
//! This binary uploads, lists, searches, downloads and reads aloud the texts
//! kept in the shared Hive Archives store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncReadExt;

use hivearchive::cli::{
    render, Cli, Command, ConfigCommand, DownloadCommand, ListCommand, ReadCommand, Session,
    UploadCommand, SPEECH_UNSUPPORTED, UPLOAD_OK,
};
use hivearchive::{
    export_as_file, init_logging, Config, DirectorySaver, FileSaver, FirebaseStore, Narrator,
    RecordStore, StoreConnection, ViewModel,
};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use hivearchive_linux::platform_name;

#[cfg(target_os = "macos")]
use hivearchive_mac::platform_name;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_name() -> &'static str {
    std::env::consts::OS
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<hivearchive::Error>()
                .map_or(1, hivearchive::Error::exit_code);
            eprintln!("Error: {err}");
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> CliResult {
    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json).await,
        Command::List(list_cmd) => handle_list(&config, list_cmd).await,
        Command::Upload(upload_cmd) => handle_upload(&config, upload_cmd).await,
        Command::Download(download_cmd) => handle_download(&config, download_cmd).await,
        Command::Read(read_cmd) => handle_read(&config, read_cmd).await,
        Command::Browse => handle_browse(&config).await,
    }
}

fn open_store(config: &Config) -> hivearchive::Result<FirebaseStore> {
    let connection = StoreConnection::from_env(&config.store.connection_env)?;
    FirebaseStore::new(connection, &config.store)
}

/// Build and load a view for one-shot commands.
async fn open_view(
    config: &Config,
    search: Option<String>,
) -> Result<ViewModel<FirebaseStore>, Box<dyn std::error::Error>> {
    let mut view = ViewModel::new(open_store(config)?, config.store.recent_limit);
    view.initialize().await?;
    if let Some(term) = search {
        view.set_search_term(term);
    }
    Ok(view)
}

async fn handle_list(config: &Config, cmd: ListCommand) -> CliResult {
    let view = open_view(config, cmd.search).await?;
    let mut stdout = std::io::stdout().lock();
    render(&mut stdout, &view.visible_records(), cmd.format)?;
    Ok(())
}

async fn handle_upload(config: &Config, cmd: UploadCommand) -> CliResult {
    let text = match cmd.text {
        Some(text) => text,
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            strip_line_ending(input)
        }
    };

    let view = ViewModel::new(open_store(config)?, config.store.recent_limit);
    match view.submit(&text).await? {
        Some(record) => {
            tracing::info!("Uploaded record {}", record.id);
            println!("{UPLOAD_OK}");
        }
        None => eprintln!("Nothing to upload."),
    }
    Ok(())
}

fn strip_line_ending(mut input: String) -> String {
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    input
}

async fn handle_download(config: &Config, cmd: DownloadCommand) -> CliResult {
    let view = open_view(config, cmd.search).await?;
    let record = view.visible_row(cmd.row)?;
    let saver = DirectorySaver::new(cmd.output.unwrap_or_else(|| config.export_directory()));
    let path = saver.save(&export_as_file(record))?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn handle_read(config: &Config, cmd: ReadCommand) -> CliResult {
    let view = open_view(config, cmd.search).await?;
    let record = view.visible_row(cmd.row)?;
    let narrator = Narrator::from_config(&config.speech);
    if !narrator.is_available() {
        eprintln!("{SPEECH_UNSUPPORTED}");
        return Ok(());
    }
    narrator.speak(&record.text).await?;
    Ok(())
}

async fn handle_browse(config: &Config) -> CliResult {
    let mut view = ViewModel::new(open_store(config)?, config.store.recent_limit);
    if let Err(err) = view.initialize().await {
        eprintln!("Could not load records: {err}");
    }
    let narrator = Narrator::from_config(&config.speech);
    let saver = DirectorySaver::new(config.export_directory());

    let mut session = Session::new(view, narrator, saver);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session.run(input, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> CliResult {
    let narrator = Narrator::from_config(&config.speech);
    let store = open_store(config);
    let (location, reachable) = match &store {
        Ok(store) => (
            Some(store.describe()),
            Some(store.fetch_recent(1).await.map_err(|e| e.to_string())),
        ),
        Err(_) => (None, None),
    };
    let store_error = store.as_ref().err().map(ToString::to_string);

    if json {
        let status = serde_json::json!({
            "platform": platform_name(),
            "store": location,
            "store_error": store_error,
            "reachable": reachable.as_ref().map(Result::is_ok),
            "recent_limit": config.store.recent_limit,
            "speech_engine": narrator.speaker_name(),
            "speech_language": narrator.language(),
            "export_directory": config.export_directory(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("hive status");
        println!("-----------");
        println!("Platform:      {}", platform_name());
        match (&location, &store_error) {
            (Some(location), _) => println!("Store:         {location}"),
            (None, Some(err)) => println!("Store:         not configured ({err})"),
            (None, None) => println!("Store:         not configured"),
        }
        match &reachable {
            Some(Ok(_)) => println!("Reachable:     yes"),
            Some(Err(err)) => println!("Reachable:     no ({err})"),
            None => {}
        }
        println!("Window:        {} records", config.store.recent_limit);
        println!(
            "Speech:        {} ({})",
            narrator.speaker_name().unwrap_or("unavailable"),
            narrator.language()
        );
        println!("Export dir:    {}", config.export_directory().display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Collection path:    {}", config.store.path);
                println!("  Connection env:     {}", config.store.connection_env);
                println!("  Recent limit:       {}", config.store.recent_limit);
                println!("  Timeout (secs):     {}", config.store.request_timeout_secs);
                println!("  Max retries:        {}", config.store.max_retries);
                println!("  Retry delay (ms):   {}", config.store.retry_delay_ms);
                println!();
                println!("[Speech]");
                println!("  Enabled:            {}", config.speech.enabled);
                println!("  Language:           {}", config.speech.language);
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_directory().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(loaded) => {
                    println!("Configuration is valid.");
                    match StoreConnection::from_env(&loaded.store.connection_env) {
                        Ok(connection) => println!("Store connection: {}", connection.database_url),
                        Err(e) => println!("Store connection error: {e}"),
                    }
                }
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
