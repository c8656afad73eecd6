use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::{DownloadError, Downloader, Invocation, ToolOutput};
use crate::config::DownloaderConfig;

const VERSION_TIMEOUT: Duration = Duration::from_secs(30);

/// yt-dlp (or a compatible fork) run as a child process
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    base_args: Vec<String>,
    timeout: Option<Duration>,
}

impl YtDlp {
    pub fn new(config: &DownloaderConfig) -> Self {
        Self {
            program: config.program.clone(),
            base_args: config.base_args.clone(),
            timeout: config.timeout(),
        }
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future (timeout, client gone) must not leave the child running.
            .kill_on_drop(true);
        cmd
    }

    async fn execute(
        &self,
        args: &[OsString],
        limit: Option<Duration>,
    ) -> Result<ToolOutput, DownloadError> {
        let child = self.command(args).spawn().map_err(DownloadError::Spawn)?;
        let waiting = child.wait_with_output();

        let output = match limit {
            Some(limit) => tokio::time::timeout(limit, waiting)
                .await
                .map_err(|_| DownloadError::TimedOut(limit))??,
            None => waiting.await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(DownloadError::Failed {
                code: output.status.code(),
                stderr,
            });
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

#[async_trait]
impl Downloader for YtDlp {
    fn name(&self) -> &str {
        &self.program
    }

    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, DownloadError> {
        let started = Instant::now();
        info!(
            program = %self.program,
            url = %invocation.url,
            kind = invocation.kind.as_str(),
            selector = invocation.profile.selector,
            "Starting downloader"
        );

        match self.execute(&invocation.args(), self.timeout).await {
            Ok(output) => {
                debug!(stdout = %output.stdout.trim_end(), "Downloader output");
                if !output.stderr.trim().is_empty() {
                    // yt-dlp reports skipped playlist entries here even on success
                    warn!(stderr = %output.stderr.trim_end(), "Downloader reported warnings");
                }
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "Downloader finished");
                Ok(output)
            }
            Err(DownloadError::Failed { code, stderr }) => {
                error!(?code, stderr = %stderr.trim_end(), "Downloader exited with failure");
                Err(DownloadError::Failed { code, stderr })
            }
            Err(err) => {
                error!(error = %err, "Downloader did not complete");
                Err(err)
            }
        }
    }

    async fn version(&self) -> Result<String, DownloadError> {
        let output = self
            .execute(&["--version".into()], Some(VERSION_TIMEOUT))
            .await?;
        Ok(output.stdout.trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::downloader::{DownloadKind, MediaFormat};
    use std::path::Path;

    /// `sh -c <script> sh <generated args...>`, so the script sees them as "$@"
    fn shell(script: &str, timeout_secs: u64) -> YtDlp {
        YtDlp::new(&DownloaderConfig {
            program: "sh".to_string(),
            base_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            timeout_secs,
        })
    }

    fn invocation() -> Invocation {
        Invocation::new(
            "https://example.com/watch?id=1",
            DownloadKind::Single,
            MediaFormat::Audio,
            Path::new("/tmp/media"),
        )
    }

    #[tokio::test]
    async fn passes_generated_arguments_through() {
        let tool = shell(r#"printf '%s\n' "$@""#, 10);

        let output = tool.run(&invocation()).await.unwrap();
        let lines: Vec<&str> = output.stdout.lines().collect();

        assert_eq!(lines[0], "--format");
        assert_eq!(lines[1], "bestaudio[ext=m4a]/bestaudio");
        assert_eq!(lines[2], "--ignore-errors");
        assert_eq!(lines.last().copied(), Some("https://example.com/watch?id=1"));
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let tool = shell("echo 'ERROR: Video unavailable' >&2; exit 1", 10);

        match tool.run(&invocation()).await {
            Err(DownloadError::Failed { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("Video unavailable"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_tool_times_out() {
        let tool = YtDlp {
            timeout: Some(Duration::from_millis(200)),
            ..shell("sleep 5", 0)
        };

        let started = Instant::now();
        let result = tool.run(&invocation()).await;

        assert!(matches!(result, Err(DownloadError::TimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let tool = YtDlp::new(&DownloaderConfig {
            program: "/nonexistent/mediagrab-test-tool".to_string(),
            base_args: Vec::new(),
            timeout_secs: 10,
        });

        assert!(matches!(
            tool.run(&invocation()).await,
            Err(DownloadError::Spawn(_))
        ));
        assert!(matches!(tool.version().await, Err(DownloadError::Spawn(_))));
    }

    #[tokio::test]
    async fn successful_run_keeps_stderr_warnings() {
        let tool = shell("echo 'WARNING: [youtube] skipped 1 item' >&2; exit 0", 10);

        let output = tool.run(&invocation()).await.unwrap();
        assert!(output.stderr.contains("skipped 1 item"));
    }

    #[tokio::test]
    async fn version_is_trimmed_stdout() {
        let tool = shell("echo 2025.01.15", 10);
        assert_eq!(tool.version().await.unwrap(), "2025.01.15");
    }
}
