//! CLI binary for the cloud-detect crate.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use cloud_detect::{
    default_detectors, CloudDetector, CloudProvider, Detection, Detector, Info, MetadataClient,
    MetadataError,
};

#[derive(Parser)]
#[command(name = "cloud-detect")]
#[command(
    author,
    version,
    about = "Detect the cloud provider hosting this machine"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the current cloud provider and print what it reports
    Detect {
        /// Only probe this provider instead of all of them
        #[arg(short, long)]
        provider: Option<CloudProvider>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Seconds allowed for each provider probe
        #[arg(long, default_value_t = 15)]
        probe_timeout: u64,

        /// Seconds allowed for each metadata request
        #[arg(long, default_value_t = 5)]
        request_timeout: u64,
    },

    /// List the providers in the order they are probed
    Providers,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn detectors(
    provider: Option<CloudProvider>,
    request_timeout: Duration,
) -> Result<Vec<Box<dyn Detector>>, MetadataError> {
    let providers = match provider {
        Some(provider) => vec![provider],
        None => CloudProvider::ALL.to_vec(),
    };

    providers
        .into_iter()
        .map(|provider| -> Result<Box<dyn Detector>, MetadataError> {
            let client = MetadataClient::new(request_timeout, provider.default_base_url())?;
            Ok(Box::new(CloudDetector::with_client(provider, client)))
        })
        .collect()
}

fn print_text(info: &Info) {
    println!("provider: {}", info.provider);
    for (label, value) in [
        ("public ip", &info.public_ip),
        ("private ip", &info.private_ip),
        ("vm environment", &info.vm_environment),
        ("instance id", &info.instance_id),
        ("region", &info.region),
    ] {
        if !value.is_empty() {
            println!("{}: {}", label, value);
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Detect {
            provider,
            format,
            probe_timeout,
            request_timeout,
        } => {
            let detectors = detectors(provider, Duration::from_secs(request_timeout))?;
            let info = Detection::new()
                .with_probe_timeout(Duration::from_secs(probe_timeout))
                .run(&detectors)
                .await?;

            match format {
                OutputFormat::Text => print_text(&info),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
            }
            Ok(())
        }

        Commands::Providers => {
            for detector in default_detectors()? {
                println!("{}", detector.name());
            }
            Ok(())
        }
    }
}
