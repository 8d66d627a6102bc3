use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// How a captured subprocess ended. Each variant carries the combined
/// stdout/stderr captured up to that point.
/// 被捕获的子进程如何结束。每个变体都带有截至该时刻捕获的合并 stdout/stderr。
#[derive(Debug)]
pub enum CommandOutcome {
    /// The process ran to completion on its own.
    Completed {
        status: std::process::ExitStatus,
        output: String,
    },
    /// The process was killed because a stop was requested.
    Stopped { output: String },
    /// The process was killed because it exceeded its timeout.
    TimedOut { output: String },
}

enum WaitOutcome {
    Status(std::io::Result<std::process::ExitStatus>),
    Stopped,
    TimedOut,
}

/// Spawns a command and captures its stdout and stderr, combined into a
/// single string in arrival order. The process is killed early when `stop`
/// is cancelled or when `timeout` elapses; partial output is still returned.
///
/// 派生一个命令并捕获其 stdout 和 stderr，按到达顺序合并为一个字符串。
/// 当 `stop` 被取消或 `timeout` 到期时进程被提前杀死；仍会返回部分输出。
pub async fn run_and_capture(
    mut cmd: tokio::process::Command,
    stop: &CancellationToken,
    timeout: Option<Duration>,
) -> std::io::Result<CommandOutcome> {
    let mut child = cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("failed to capture child stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("failed to capture child stderr"))?;

    // Use an Arc<Mutex<String>> to allow concurrent writes from stdout and stderr tasks.
    // 使用 Arc<Mutex<String>> 来允许多个任务（stdout 和 stderr）并发写入。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let reader = BufReader::new(stdout);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let reader = BufReader::new(stderr);
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let timeout_elapsed = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };

    // The `child.wait()` borrow ends with the select, so the child can be
    // killed afterwards in the stop and timeout branches.
    let wait_outcome = tokio::select! {
        biased;
        _ = stop.cancelled() => WaitOutcome::Stopped,
        _ = timeout_elapsed => WaitOutcome::TimedOut,
        status = child.wait() => WaitOutcome::Status(status),
    };

    if !matches!(wait_outcome, WaitOutcome::Status(_)) {
        let _ = child.kill().await;
    }

    // Wait for the reading tasks to reach EOF so all output is captured.
    // 等待读取任务到达 EOF，以确保捕获所有输出。
    if let Err(e) = stdout_handle.await {
        eprintln!("Failed to join stdout task: {}", e);
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("Failed to join stderr task: {}", e);
    }

    let output = output.lock().await.clone();
    match wait_outcome {
        WaitOutcome::Status(Ok(status)) => Ok(CommandOutcome::Completed { status, output }),
        WaitOutcome::Status(Err(e)) => Err(e),
        WaitOutcome::Stopped => Ok(CommandOutcome::Stopped { output }),
        WaitOutcome::TimedOut => Ok(CommandOutcome::TimedOut { output }),
    }
}
