use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Run `program`, feeding `input` on stdin and collecting stdout
///
/// The child is killed if the returned future is dropped. A non-zero exit
/// is reported together with the trimmed stderr output.
pub(crate) async fn run_piped(program: &Path, args: &[String], input: Vec<u8>) -> Result<Vec<u8>, String> {
    let name = program.display().to_string();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("failed to start {name}: {e}"))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format!("stdin of {name} was not captured"))?;

    // Feed stdin concurrently so a child filling its stdout pipe cannot deadlock us
    let writer = tokio::spawn(async move {
        stdin.write_all(&input).await?;
        stdin.shutdown().await
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("failed to wait for {name}: {e}"))?;

    let written = writer.await.map_err(|e| format!("stdin writer for {name} failed: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        return Err(if stderr.is_empty() {
            format!("{name} exited with {}", output.status)
        } else {
            format!("{name} exited with {}: {stderr}", output.status)
        });
    }

    written.map_err(|e| format!("failed to write input to {name}: {e}"))?;

    Ok(output.stdout)
}
