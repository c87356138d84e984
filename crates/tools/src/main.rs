use std::path::PathBuf;

use clap::{Parser, Subcommand};
use controller::ViewerLocation;
use formats::save_state_file;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline companion to the 3D model viewer")]
struct Args {
    /// Configuration (or saved state) JSON file
    #[arg(long)]
    config: PathBuf,

    /// Viewer query string, without the leading '?'
    #[arg(long, default_value = "")]
    query: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and summarise it
    Check,

    /// Print the share URL for the configuration's home view
    ShareUrl {
        /// Viewer page URL
        #[arg(long)]
        base_url: String,

        /// Configuration path as the page should fetch it
        #[arg(long)]
        config_path: Option<String>,
    },

    /// Print the section image server URLs
    SectionUrl,

    /// Print the renderer calls made when the viewer starts
    Plan,

    /// Write the normalised state as a saved-state file
    Save {
        #[arg(long, default_value = formats::SAVED_STATE_FILE_NAME)]
        out: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    debug!(?args, "modelview");
    let loaded = tools::load(&args.config, &args.query)?;
    if let Some(err) = &loaded.param_error {
        warn!(%err, "query parameters only partly applied");
    }

    match args.command {
        Command::Check => print!("{}", tools::check_report(&loaded)),
        Command::ShareUrl {
            base_url,
            config_path,
        } => {
            let config_path =
                config_path.unwrap_or_else(|| args.config.display().to_string());
            println!("{}", tools::share_url(&base_url, &config_path, &loaded.state));
        }
        Command::SectionUrl => {
            let urls = tools::section_urls(&loaded.state);
            if urls.is_empty() {
                return Err("no active section with an image server".to_string());
            }
            for (label, url) in urls {
                println!("{label}: {url}");
            }
        }
        Command::Plan => {
            let location = ViewerLocation {
                base_url: String::new(),
                config_path: args.config.display().to_string(),
            };
            let (commands, _) = tools::render_plan(loaded.config, &args.query, location);
            for cmd in &commands {
                println!("{}", tools::describe(cmd));
            }
        }
        Command::Save { out } => {
            save_state_file(&out, &loaded.state).map_err(|e| e.to_string())?;
            println!("wrote {}", out.display());
        }
    }
    Ok(())
}
