use crate::domain::model::{GeneratedCode, RunOutput};
use crate::domain::ports::Executor;
use crate::utils::error::{Result, TrackError};
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};

const SCRIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs generated source through an external interpreter.
pub struct ScriptRunner {
    program: String,
    args: Vec<String>,
    envs: Vec<(&'static str, String)>,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            envs: Vec::new(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    /// Python 執行時關閉輸出緩衝
    pub fn python(program: impl Into<String>) -> Self {
        Self::new(program, vec!["-u".to_string()])
    }

    pub fn with_envs(mut self, envs: Vec<(&'static str, String)>) -> Self {
        self.envs = envs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Executor for ScriptRunner {
    async fn execute(&self, code: &GeneratedCode) -> Result<RunOutput> {
        // tempfile 在 drop 時自動刪除
        let mut script = tempfile::Builder::new()
            .prefix("carrier-client-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(code.source.as_bytes())?;
        script.flush()?;

        tracing::debug!(
            "Running {} {:?} {}",
            self.program,
            self.args,
            script.path().display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(script.path())
            .envs(self.envs.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TrackError::ExecutionError {
                message: format!("could not start {}: {}", self.program, e),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async move {
            let output = merge_lines(stdout, stderr).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, output))
        };

        let (status, output) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| TrackError::ExecutionError {
                message: format!("script did not finish within {:?}", self.timeout),
            })?
            .map_err(|e| TrackError::ExecutionError {
                message: format!("reading output of {} failed: {}", self.program, e),
            })?;

        Ok(RunOutput {
            exit_code: status.code().unwrap_or(-1),
            output,
        })
    }
}

/// stdout 與 stderr 依行的到達順序合併
async fn merge_lines(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) -> std::io::Result<String> {
    let mut out = stdout.map(BufReader::new);
    let mut err = stderr.map(BufReader::new);
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut merged = String::new();

    while out.is_some() || err.is_some() {
        tokio::select! {
            read = read_line(&mut out, &mut out_buf), if out.is_some() => {
                if read? == 0 {
                    out = None;
                }
                push_line(&mut merged, &mut out_buf);
            }
            read = read_line(&mut err, &mut err_buf), if err.is_some() => {
                if read? == 0 {
                    err = None;
                }
                push_line(&mut merged, &mut err_buf);
            }
        }
    }
    Ok(merged)
}

async fn read_line<R: AsyncRead + Unpin>(
    reader: &mut Option<BufReader<R>>,
    buf: &mut Vec<u8>,
) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read_until(b'\n', buf).await,
        None => Ok(0),
    }
}

fn push_line(merged: &mut String, buf: &mut Vec<u8>) {
    if buf.is_empty() {
        return;
    }
    merged.push_str(&String::from_utf8_lossy(buf));
    if !merged.ends_with('\n') {
        merged.push('\n');
    }
    buf.clear();
}
