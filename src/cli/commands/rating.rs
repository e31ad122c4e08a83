//! `rating-report` command

use crate::core::rating::{build_dashboard, RatingResponse};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the rating-report command
#[derive(Args, Debug)]
pub struct RatingReportArgs {
    /// JSON array of `{"key": ..., "value": ...}` answers
    #[arg(short, long)]
    pub input: PathBuf,
}

impl RatingReportArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let contents = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let responses: Vec<RatingResponse> = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a list of rating answers", self.input.display()))?;

        match build_dashboard(&responses) {
            Ok(dashboard) => {
                tracing::info!(num_ratings = dashboard.num_ratings, "Rating dashboard built");
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                Ok(0)
            }
            Err(e) => {
                println!("❌ {e}");
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_unknown_answer_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"key": "question_1_friendliness", "value": "meh"}}]"#
        )
        .unwrap();

        let args = RatingReportArgs {
            input: file.path().to_path_buf(),
        };
        assert_eq!(args.execute().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_report() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"key": "question_1_friendliness", "value": "satisfied"}},
               {{"key": "question_3_waiting_times_length", "value": "all-day"}}]"#
        )
        .unwrap();

        let args = RatingReportArgs {
            input: file.path().to_path_buf(),
        };
        assert_eq!(args.execute().await.unwrap(), 0);
    }
}
