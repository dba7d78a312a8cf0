use crate::utils::error::{RunnerError, Result};
use std::ffi::OsStr;
use tokio::process::Command;

/// Runs an external command to completion, logging its output line by line.
///
/// A non-zero exit status is an error.
pub async fn run_cmds<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect();
    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");

    tracing::info!("Commands:");
    tracing::info!("{}", command_line);

    let output = Command::new(program)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| RunnerError::CommandSpawnError {
            program: program.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.is_empty() {
        tracing::info!("Standard output of subprocess:");
        for line in stdout.lines() {
            tracing::info!("{}", line);
        }
    }
    if !stderr.is_empty() {
        tracing::info!("Standard error of subprocess:");
        for line in stderr.lines() {
            tracing::info!("{}", line);
        }
    }

    if !output.status.success() {
        return Err(RunnerError::CommandFailed {
            command: command_line,
            code: output.status.code(),
        });
    }

    Ok(())
}
