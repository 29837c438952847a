//! CLI parse: clap types for grantdesk. Definitions plus config overrides.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::models::GenerationRequest;

/// grantdesk - submit, review and export drafts from the grant-writing service
#[derive(Parser)]
#[command(name = "grantdesk")]
#[command(about = "Submit, review and export grant applications drafted by the grant-writing service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the grant service (overrides GRANT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory the exported document is written to (overrides GRANT_OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Delay between status checks in milliseconds (overrides GRANT_POLL_INTERVAL_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start generating a grant application; missing fields are prompted for
    Submit {
        /// Organization name
        #[arg(long)]
        name: Option<String>,
        /// Organization mission
        #[arg(long)]
        mission: Option<String>,
        /// Organization website
        #[arg(long)]
        website: Option<String>,
        /// URL of the grant opportunity
        #[arg(long)]
        grant_url: Option<String>,
        /// Exit once generation has started instead of waiting for the draft
        #[arg(long)]
        no_review: bool,
        /// Save the draft as a document as soon as it is ready, without editing
        #[arg(long)]
        export_only: bool,
    },
    /// Wait for the current draft, then edit it and save it as a document
    Review {
        /// Save the draft as a document as soon as it is ready, without editing
        #[arg(long)]
        export_only: bool,
    },
}

impl Cli {
    /// Command-line flags win over environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(level) = &self.log_level {
            config.rust_log = level.clone();
        }
    }
}

impl Commands {
    /// Form values given on the command line; blanks are prompted for later.
    pub fn request_fields(&self) -> Option<GenerationRequest> {
        match self {
            Commands::Submit {
                name,
                mission,
                website,
                grant_url,
                ..
            } => Some(GenerationRequest {
                nonprofit_name: name.clone().unwrap_or_default(),
                nonprofit_mission: mission.clone().unwrap_or_default(),
                nonprofit_website: website.clone().unwrap_or_default(),
                grant_url: grant_url.clone().unwrap_or_default(),
            }),
            Commands::Review { .. } => None,
        }
    }
}
