use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mp3_batch::cli::{Cli, Commands, DownloadArgs};
use mp3_batch::{classify, input, output, utils, BatchError, BatchRunner, Config, YtDlpDownloader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // library and binary targets
                EnvFilter::new(format!("mp3_batch={0},mp3batch={0}", default_level))
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("ERROR: {:#}", err);
        let code = err
            .downcast_ref::<BatchError>()
            .map_or(1, BatchError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let config = Config::load(cli.config.as_deref())?;

    match cli
        .command
        .unwrap_or_else(|| Commands::Download(DownloadArgs::default()))
    {
        Commands::Download(args) => download(config, args, quiet).await,
        Commands::Classify { urls } => {
            for url in urls {
                println!("{:<16} {}", classify(&url).to_string(), url);
            }
            Ok(())
        }
        Commands::Config { init } => {
            if init {
                let path = Config::user_config_path()?;
                if path.exists() {
                    println!("Config file already exists: {}", path.display());
                } else {
                    Config::default().save(&path)?;
                    println!("Default config written to: {}", path.display());
                }
            }
            config.display();
            Ok(())
        }
    }
}

async fn download(mut config: Config, args: DownloadArgs, quiet: bool) -> Result<()> {
    if let Some(input) = args.input {
        config.app.input_file = input;
    }
    if let Some(output) = args.output {
        config.app.output_dir = output;
    }
    if let Some(downloader) = args.downloader {
        config.downloader.command = downloader;
    }
    if let Some(transcoder) = args.transcoder {
        config.downloader.transcoder = transcoder;
    }
    config.validate()?;

    utils::check_prerequisites(&config.required_executables())?;
    let urls = input::read_urls(&config.app.input_file)?;
    tracing::info!(
        "Loaded {} URL(s) from {}",
        urls.len(),
        config.app.input_file.display()
    );

    let runner = BatchRunner::new(&config, YtDlpDownloader::from_config(&config.downloader))
        .with_dry_run(args.dry_run)
        .with_progress(!quiet && console::user_attended_stderr());

    let report = runner.run_all(&urls).await;
    output::print_summary(&report);

    if let Some(path) = &args.report {
        match output::save_report(&report, path, args.report_format) {
            Ok(()) => println!("Report saved to: {}", path.display()),
            Err(e) => eprintln!("Could not save report to {}: {:#}", path.display(), e),
        }
    }

    let output_root = fs_err::canonicalize(&config.app.output_dir)
        .unwrap_or_else(|_| config.app.output_dir.clone());
    println!("\nAll done. MP3 files saved in: {}", output_root.display());

    Ok(())
}
