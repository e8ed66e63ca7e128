use clap::{Parser, ValueEnum};
use log::LevelFilter;
use save_page::FailurePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "save-page")]
#[command(about = "Saves a web page and its resources into a single MIME-HTML (.mht) file")]
#[command(version)]
pub struct Args {
    /// URL of the page to save (may also come from --config)
    pub url: Option<String>,

    /// Write the archive to FILE instead of "<page title>.mht"
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print debug and verbose status messages
    #[arg(short, long)]
    pub debug: bool,

    /// Print verbose status messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of concurrent fetches
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Maximum reference depth below the page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum number of distinct resources to save
    #[arg(long)]
    pub max_resources: Option<usize>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// What to do when a resource cannot be fetched
    #[arg(long, value_enum)]
    pub on_error: Option<OnErrorArg>,

    /// Resolve references by plain string concatenation with the page URL
    #[arg(long)]
    pub legacy_urls: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnErrorArg {
    /// Leave the resource out and continue
    Skip,
    /// Stop without writing an archive
    Abort,
}

/// Convert from CLI argument policy to internal policy
pub fn convert_failure_policy(arg: OnErrorArg) -> FailurePolicy {
    match arg {
        OnErrorArg::Skip => FailurePolicy::Skip,
        OnErrorArg::Abort => FailurePolicy::Abort,
    }
}

impl Args {
    /// Log level selected by the verbosity flags, most verbose wins
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let args = Args::parse_from([
            "save-page",
            "https://example.com/",
            "-f",
            "out.mht",
            "-v",
            "--on-error",
            "abort",
            "--max-depth",
            "2",
        ]);
        assert_eq!(args.url.as_deref(), Some("https://example.com/"));
        assert_eq!(args.file, Some(PathBuf::from("out.mht")));
        assert_eq!(args.log_level(), LevelFilter::Info);
        assert_eq!(args.on_error, Some(OnErrorArg::Abort));
        assert_eq!(args.max_depth, Some(2));
        assert!(!args.legacy_urls);
    }

    #[test]
    fn test_verbosity_precedence() {
        let args = Args::parse_from(["save-page", "-q", "-d"]);
        assert_eq!(args.log_level(), LevelFilter::Debug);

        let args = Args::parse_from(["save-page", "-q"]);
        assert_eq!(args.log_level(), LevelFilter::Error);

        let args = Args::parse_from(["save-page"]);
        assert_eq!(args.log_level(), LevelFilter::Warn);
        assert!(args.url.is_none());
    }
}
