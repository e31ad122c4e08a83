//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

/// MomConnect - maternal health registration backend
#[derive(Parser, Debug)]
#[command(name = "momconnect")]
#[command(version, about, long_about = None)]
#[command(author = "MomConnect Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "momconnect.toml", env = "MOMCONNECT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MOMCONNECT_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the subscription plan for an authority and due date
    Plan(commands::plan::PlanArgs),

    /// Submit mother registrations
    Register(commands::register::RegisterArgs),

    /// Submit nurse registrations
    RegisterNurse(commands::register::RegisterArgs),

    /// Build the clinic service-rating dashboard
    RatingReport(commands::rating::RatingReportArgs),
}

impl Cli {
    /// Runs the selected command and returns the process exit code
    pub async fn run(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Init(args) => args.execute().await,
            Commands::ValidateConfig(args) => args.execute(&self.config).await,
            Commands::Plan(args) => args.execute(&self.config).await,
            Commands::Register(args) => args.execute(&self.config).await,
            Commands::RegisterNurse(args) => args.execute_nurse(&self.config).await,
            Commands::RatingReport(args) => args.execute().await,
        }
    }
}
