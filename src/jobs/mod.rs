//! Sequential batch driver behind `fetch`: one job per recognized link, resolved in input order.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Instant;

use crate::extractors::{extract_video_id, RetrievalOutcome, VideoId, VideoTranscript};
use crate::transcribe::TranscriptPipeline;
use crate::utils::{format_duration, split_links};
use crate::TranscriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Loading,
    Done,
    Error,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Loading => write!(f, "loading"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    /// The line as the user wrote it
    pub link: String,

    /// Extracted identifier, not yet validated
    pub video_id: String,

    pub status: JobStatus,
    pub result: Option<VideoTranscript>,
    pub error: Option<String>,
}

impl Job {
    fn new(link: String, video_id: String) -> Self {
        Self {
            link,
            video_id,
            status: JobStatus::Pending,
            result: None,
            error: None,
        }
    }

    fn finish(&mut self, outcome: Result<VideoTranscript, TranscriptError>) {
        match outcome {
            Ok(found) => {
                self.status = JobStatus::Done;
                self.result = Some(found);
            }
            Err(e) => {
                self.status = JobStatus::Error;
                self.error = Some(e.to_string());
            }
        }
    }
}

/// Build jobs from pasted input; lines with no recognizable link are skipped
pub fn parse_links(input: &str) -> Vec<Job> {
    split_links(input)
        .into_iter()
        .filter_map(|line| {
            let id = extract_video_id(&line)?;
            Some(Job::new(line, id))
        })
        .collect()
}

/// Refuse batches larger than `max_links`
pub fn check_batch_size(jobs: &[Job], max_links: usize) -> anyhow::Result<()> {
    if jobs.len() > max_links {
        anyhow::bail!("Please enter {} or fewer links at a time.", max_links);
    }
    Ok(())
}

/// Counts after a batch has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub done: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_failed(&self) -> bool {
        self.done == 0 && self.failed > 0
    }
}

pub struct JobDriver<'a> {
    pipeline: &'a TranscriptPipeline,
    quiet: bool,
}

impl<'a> JobDriver<'a> {
    pub fn new(pipeline: &'a TranscriptPipeline, quiet: bool) -> Self {
        Self { pipeline, quiet }
    }

    /// Resolve every job one after another, updating status in place
    pub async fn run(&self, jobs: &mut [Job]) -> anyhow::Result<BatchSummary> {
        let started = Instant::now();
        let progress = self.progress_bar(jobs.len())?;

        for job in jobs.iter_mut() {
            job.status = JobStatus::Loading;
            progress.set_message(format!("{} ({})", job.video_id, job.status));
            tracing::debug!("Job {} is {}", job.video_id, job.status);

            let outcome = self.resolve(&job.video_id).await;
            job.finish(outcome);

            let line = match (&job.result, &job.error) {
                (Some(found), _) => format!(
                    "{} {} {}",
                    style("✓").green(),
                    job.video_id,
                    style(found.title.as_deref().unwrap_or(crate::server::UNKNOWN_TITLE)).bold()
                ),
                (None, error) => format!(
                    "{} {} {}",
                    style("✗").red(),
                    job.video_id,
                    style(error.as_deref().unwrap_or("Failed")).dim()
                ),
            };
            progress.println(line);
            progress.inc(1);
        }

        let summary = BatchSummary {
            done: jobs.iter().filter(|j| j.status == JobStatus::Done).count(),
            failed: jobs.iter().filter(|j| j.status == JobStatus::Error).count(),
        };

        progress.finish_with_message(format!(
            "{} of {} done in {}",
            summary.done,
            jobs.len(),
            format_duration(started.elapsed())
        ));
        Ok(summary)
    }

    async fn resolve(&self, candidate: &str) -> Result<VideoTranscript, TranscriptError> {
        let video_id = VideoId::parse(candidate)?;

        match self.pipeline.resolve(&video_id).await.outcome {
            RetrievalOutcome::Success(found) => Ok(found),
            RetrievalOutcome::NotFound { reason } | RetrievalOutcome::TransientFailure { reason } => {
                Err(TranscriptError::NotFound(Some(reason)))
            }
        }
    }

    fn progress_bar(&self, len: usize) -> anyhow::Result<ProgressBar> {
        if self.quiet {
            return Ok(ProgressBar::hidden());
        }

        let progress = ProgressBar::new(len as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")?,
        );
        Ok(progress)
    }
}
