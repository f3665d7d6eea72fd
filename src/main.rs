// ┌─┐┌─┐┬  ┌─┐┌┬┐┬┌┐┌  ┬ ┬┬ ┬┌┐ 
// │ ┬├┤ │  ├─┤ │ ││││  ├─┤│ │├┴┐
// └─┘└─┘┴─┘┴ ┴ ┴ ┴┘└┘  ┴ ┴└─┘└─┘

// Protein Gelatin Research Hub client
// Checks articles for duplicates, uploads CSV sheets, shows statistics and exports the database.

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gelatin_hub::form::FieldEvent;
use gelatin_hub::ingest::UploadFile;
use gelatin_hub::shell::Shell;
use gelatin_hub::{
    CheckEncoding, ConsoleRenderer, FlagPolicy, HttpApi, Hub, HubConfig, SessionClient,
};

// CL arguments, override the config file
#[derive(Parser, Debug)]
#[command(author, version, about = "Protein Gelatin Research Hub client: duplicate checks, CSV upload, stats and export", long_about = None)]
struct Args {
    /// Hub server address
    #[arg(short, long, env = "GELATIN_HUB_URL")]
    server: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "GELATIN_HUB_CONFIG")]
    config: Option<PathBuf>,

    /// Largest accepted upload in megabytes
    #[arg(long)]
    max_upload_mb: Option<u64>,

    /// How hardness/WHC cells are read
    #[arg(long, value_enum)]
    flags: Option<FlagPolicy>,

    /// Body encoding for /check_article
    #[arg(long, value_enum)]
    check_encoding: Option<CheckEncoding>,

    /// Where exports are written
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check one article for duplicates and save it when new
    Check {
        doi: String,
        #[arg(short, long, default_value = "")]
        title: String,
        #[arg(short, long, default_value = "")]
        protein: String,
        #[arg(long, default_value_t = false)]
        hardness: bool,
        #[arg(long, default_value_t = false)]
        whc: bool,
        /// CSV to load as the local duplicate cache first
        #[arg(long)]
        against: Option<PathBuf>,
    },
    /// Upload a CSV (or Excel) file of articles
    Upload { file: PathBuf },
    /// Show database statistics
    Stats,
    /// Download the database as CSV
    Export,
    Register {
        email: String,
        #[arg(long, env = "GELATIN_HUB_PASSWORD")]
        password: String,
    },
    Login {
        email: String,
        #[arg(long, env = "GELATIN_HUB_PASSWORD")]
        password: String,
    },
    Logout { email: String },
    /// List currently active users
    ActiveUsers,
    /// Interactive session (the default)
    Session,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gelatin_hub=debug" } else { "gelatin_hub=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> Result<HubConfig> {
    let mut config = HubConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(server) = &args.server {
        config.base_url = server.clone();
    }
    if let Some(mb) = args.max_upload_mb {
        config.max_upload_mb = mb;
    }
    if let Some(policy) = args.flags {
        config.flag_policy = policy;
    }
    if let Some(encoding) = args.check_encoding {
        config.check_encoding = encoding;
    }
    if let Some(dir) = &args.export_dir {
        config.export_dir = dir.clone();
    }
    Ok(config)
}

fn status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = build_config(&args)?;
    info!("Using hub at {}", config.base_url);

    let api = HttpApi::new(&config).context("Failed to build HTTP client")?;
    let mut session = SessionClient::new(api.clone());
    let mut renderer = ConsoleRenderer::new();

    let command = args.command.unwrap_or(Command::Session);
    if matches!(command, Command::Check { .. }) {
        // Nothing is left on screen to clear.
        config.form_clear_delay_ms = 0;
    }
    let mut hub = Hub::new(api, ConsoleRenderer::new(), config);

    let code = match command {
        Command::Check { doi, title, protein, hardness, whc, against } => {
            if let Some(path) = against {
                let file = UploadFile::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let valid = hub
                    .load_local_cache(&file)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                info!("{} DOIs loaded from {}", valid, path.display());
            }
            let form = hub.form_mut();
            form.doi = doi;
            form.title = title;
            form.protein = protein;
            form.hardness = hardness;
            form.whc = whc;
            hub.doi_event(FieldEvent::Blur);
            status(hub.check_duplicate().await.is_ok())
        }
        Command::Upload { file } => {
            let file = UploadFile::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            status(hub.upload_file(Some(file)).await.is_ok())
        }
        Command::Stats => {
            hub.show_stats().await;
            ExitCode::SUCCESS
        }
        Command::Export => status(hub.download_database().await.is_ok()),
        Command::Register { email, password } => {
            status(session.register(&email, &password, &mut renderer).await.is_ok())
        }
        Command::Login { email, password } => {
            let outcome = session.login(&email, &password, &mut renderer).await;
            status(matches!(outcome, Ok(gelatin_hub::LoginOutcome::LoggedIn)))
        }
        Command::Logout { email } => status(session.logout(Some(email.as_str()), &mut renderer).await.is_ok()),
        Command::ActiveUsers => {
            session.refresh_active_users(&mut renderer).await;
            ExitCode::SUCCESS
        }
        Command::Session => {
            println!("{}", "=".repeat(64));
            println!("   Protein Gelatin Research Hub");
            println!("{}", "=".repeat(64));
            println!("Server: {}", hub.config().base_url);
            println!("Type 'help' for commands.\n");

            let mut shell = Shell::new(hub, session);
            shell.run(BufReader::new(tokio::io::stdin())).await?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
