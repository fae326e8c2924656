use clap::Parser;
use plate_triage::{cli, config, error, export, intake};
use plate_triage::{GeminiClient, Session, SessionStatus, TriageRunner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { paths, json, pdf } => {
            println!("🔧 plate-triage - data plate analysis\n");

            // 1. 画像取り込み
            println!("[1/3] Reading images...");
            let files = intake::expand_paths(&paths)?;
            let limits = intake::IntakeLimits::from(&config);
            let mut store = intake::PreviewStore::new()?;
            let selection = match intake::select_images(&mut store, &files, &limits)? {
                Some(selection) => selection,
                None => {
                    println!("No images selected.");
                    return Ok(());
                }
            };
            for preview in selection.previews() {
                println!("  - {} ({})", preview.file_name(), preview.media_type());
            }
            println!("✔ {} image(s) ready\n", selection.len());

            // 2. AI解析
            println!("[2/3] Analyzing...");
            let runner = TriageRunner::new(GeminiClient::from_config(&config)?, config.timeout());
            let mut session = Session::new();
            let status = runner.run(&mut session, selection).await?;

            if status != SessionStatus::Complete {
                let message = session.error_message().unwrap_or(plate_triage::analyzer::USER_ERROR_MESSAGE);
                eprintln!("\n✖ {}", message);
                session.reset();
                drop(store);
                std::process::exit(1);
            }
            println!("✔ Analysis complete\n");

            // 3. レポート
            println!("[3/3] Report");
            if let Some(record) = session.result() {
                let report = export::report_for(record);
                print!("{}", export::render_text(&report));

                if let Some(path) = json {
                    export::write_json(record, &path)?;
                    println!("✔ JSON saved: {}", path.display());
                }
                if let Some(path) = pdf {
                    export::pdf::generate_pdf(&report, &path)?;
                    println!("✔ PDF saved: {}", path.display());
                }
            }

            session.reset();
        }

        Commands::Report { input, pdf } => {
            let record = export::load_record(&input)?;
            let report = export::report_for(&record);
            print!("{}", export::render_text(&report));

            if let Some(path) = pdf {
                export::pdf::generate_pdf(&report, &path)?;
                println!("✔ PDF saved: {}", path.display());
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if show {
                println!("Settings:");
                println!("  Model: {}", config.model);
                println!("  Endpoint: {}", config.api_base_url);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Max images: {}", config.max_images);
                println!("  Max image size: {} bytes", config.max_image_bytes);
                println!("  API key: {}", if config.get_api_key().is_ok() { "set" } else { "not set" });
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "plate_triage=debug,plate_triage_common=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
