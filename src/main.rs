use clap::Parser;
use save_page::{Snapshot, UrlResolution};

mod args;
use args::{Args, convert_failure_policy};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging, RUST_LOG overrides the verbosity flags
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level().to_string()),
    )
    .init();

    let snapshot = match build_snapshot(&args) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            ::log::error!("{}", e);
            std::process::exit(2);
        }
    };

    ::log::info!("Saving page: {}", snapshot.config().url);

    match snapshot.save().await {
        Ok((path, retrieval)) => {
            if !retrieval.failed.is_empty() {
                ::log::warn!(
                    "{} resources could not be fetched and were left out",
                    retrieval.failed.len()
                );
            }
            if !args.quiet {
                println!(
                    "Saved {} resources to {}",
                    retrieval.container.len(),
                    path.display()
                );
            }
        }
        Err(e) => {
            ::log::error!("Failed to save page: {}", e);
            std::process::exit(1);
        }
    }
}

/// Apply the config file first, then any flags given on the command line
fn build_snapshot(args: &Args) -> save_page::Result<Snapshot> {
    let mut snapshot = Snapshot::new(args.url.as_deref().unwrap_or_default());

    if let Some(path) = &args.config {
        snapshot = snapshot.with_config_file(path)?;
        if let Some(url) = &args.url {
            let mut config = snapshot.config().clone();
            config.url = url.clone();
            snapshot = snapshot.with_config(config);
        }
    }

    if let Some(file) = &args.file {
        snapshot = snapshot.with_output(file);
    }
    if let Some(concurrency) = args.concurrency {
        snapshot = snapshot.with_max_concurrency(concurrency);
    }
    if args.max_depth.is_some() {
        snapshot = snapshot.with_max_depth(args.max_depth);
    }
    if args.max_resources.is_some() {
        snapshot = snapshot.with_max_resources(args.max_resources);
    }
    if let Some(policy) = args.on_error {
        snapshot = snapshot.with_failure_policy(convert_failure_policy(policy));
    }
    if args.legacy_urls {
        snapshot = snapshot.with_url_resolution(UrlResolution::Concat);
    }
    if args.timeout.is_some() {
        snapshot = snapshot.with_timeout(args.timeout);
    }

    if snapshot.config().url.is_empty() {
        return Err(save_page::ArchiveError::InvalidUrl(
            "no page URL given".to_string(),
        ));
    }
    Ok(snapshot)
}
