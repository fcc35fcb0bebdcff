use airmap::{
    AirMapConfig, AirMapError, AssessmentRequest, HtmlMapRenderer, UserProfile, WaqiClient,
    pipeline,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "airmap",
    version,
    about = "Assess air quality risk for a city and render it on an interactive map"
)]
struct Args {
    /// Location to look up, e.g. a city name
    #[arg(short, long)]
    location: Option<String>,

    /// Age of the person being assessed
    #[arg(long, allow_negative_numbers = true)]
    age: Option<i32>,

    /// The person being assessed is pregnant (`--pregnant false` overrides config)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pregnant: Option<bool>,

    /// Nationality of the person being assessed
    #[arg(long)]
    nationality: Option<String>,

    /// Output HTML file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// WAQI API token
    #[arg(long, env = "WAQI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(config: &AirMapConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match AirMapConfig::load_from_path(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config, args.verbose);

    if let Some(token) = args.token.clone() {
        config.waqi.token = Some(token);
        if let Err(e) = config.validate_token() {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    }
    debug!("Using config: {:?}", config.map);

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if !matches!(e, AirMapError::FetchFailure { .. }) {
                eprintln!("{}", e.user_message());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args, config: &AirMapConfig) -> airmap::Result<()> {
    let token = config.require_token()?;

    let defaults = &config.defaults;
    let request = AssessmentRequest {
        location: args
            .location
            .clone()
            .unwrap_or_else(|| defaults.location.clone()),
        profile: UserProfile::new(
            args.age.unwrap_or(defaults.age),
            args.pregnant.unwrap_or(defaults.pregnant),
            args.nationality
                .clone()
                .unwrap_or_else(|| defaults.nationality.clone()),
        ),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.map.output_path));

    let client = WaqiClient::new(config.waqi.api_base_url.as_str(), token)?;
    let renderer = HtmlMapRenderer::new(output, &config.waqi.tiles_base_url, token)
        .with_zoom(config.map.zoom)
        .with_marker_radius(config.map.marker_radius);

    let mut stdout = std::io::stdout().lock();
    pipeline::run(&client, &renderer, &request, &mut stdout)?;
    Ok(())
}
