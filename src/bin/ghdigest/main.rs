mod clipboard;

use anyhow::Context;
use ghdigest::{GitHub, QuerySet, build_digest, parse_args};
use tracing::warn;

use crate::clipboard::copy_to_clipboard;

fn handle_clap_error(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let spec = match parse_args(std::env::args_os()) {
        Ok(spec) => spec,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_error(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let queries = QuerySet::load(spec.queries_dir.as_deref())?;
    let github = GitHub::from_env(&spec.endpoint)?;

    let markdown = build_digest(&github, &queries, &spec)
        .await
        .with_context(|| format!("Failed to collect activity for '{}'", spec.login))?;

    println!("{markdown}");

    if spec.copy_to_clipboard {
        if let Err(err) = copy_to_clipboard(&markdown) {
            warn!("{err:#}");
        }
    }

    Ok(())
}
