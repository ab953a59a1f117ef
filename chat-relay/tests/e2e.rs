use std::{path::Path, process::Stdio, time::Duration};

use anyhow::{Context, Result, anyhow};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    process::{Child, ChildStdin, ChildStdout, Command},
    time::timeout,
};

const READ_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test]
async fn cli_chat_end_to_end() -> Result<()> {
    let binary = assert_cmd::cargo::cargo_bin!("chat_relay");

    let (mut server_child, mut server_stdout) = spawn_server(&binary).await?;
    let addr = read_server_addr(&mut server_stdout).await?;

    // Drain additional server logs in the background so the pipe never fills.
    let server_log_task = tokio::spawn(async move {
        drain_stdout(server_stdout).await;
    });

    let mut alice = spawn_client(&binary, &addr).await?;
    expect_lines(
        &mut alice,
        &[
            "home chat room created",
            "1 joined the chat",
            "successfully joined the chat server",
        ],
    )
    .await?;

    alice.send_line("whoAmI").await.context("alice whoAmI")?;
    expect_lines(&mut alice, &["whoAmI? My ID 1"]).await?;

    let mut bob = spawn_client(&binary, &addr).await?;
    expect_lines(
        &mut bob,
        &[
            "1 joined the chat",
            "2 joined the chat",
            "successfully joined the chat server",
        ],
    )
    .await?;
    expect_lines(&mut alice, &["2 joined the chat"]).await?;

    alice
        .send_line("sendMessage Hello from Alice")
        .await
        .context("alice send line")?;
    expect_lines(&mut bob, &["1: Hello from Alice"]).await?;
    expect_lines(&mut alice, &["1: Hello from Alice"]).await?;

    bob.send_line("nonsense").await.context("bob send line")?;
    expect_lines(&mut bob, &["unknown command"]).await?;

    // Closing stdin ends each client once the server hangs up.
    ensure_success(alice, "alice client").await?;
    ensure_success(bob, "bob client").await?;

    // The server has no exit command; terminate it manually.
    let _ = server_child.kill().await;
    let _ = server_child.wait().await;
    let _ = server_log_task.await;

    Ok(())
}

struct ClientProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ClientProcess {
    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.stdin
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to send line '{line}'"))?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }
}

async fn spawn_server(binary: &Path) -> Result<(Child, BufReader<ChildStdout>)> {
    let mut cmd = Command::new(binary);
    cmd.arg("server")
        .arg("--listen")
        .arg("127.0.0.1:0")
        .env("RUST_LOG_STYLE", "never")
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = cmd.spawn().context("failed to spawn server")?;
    let stdout = child
        .stdout
        .take()
        .context("server stdout missing after spawn")?;

    Ok((child, BufReader::new(stdout)))
}

async fn read_server_addr(reader: &mut BufReader<ChildStdout>) -> Result<String> {
    let line = read_line(reader)
        .await?
        .context("server did not emit listening address")?;
    let trimmed = line.trim();
    let addr = trimmed
        .split_whitespace()
        .last()
        .context("unexpected server banner format")?;
    if !addr.contains(':') {
        return Err(anyhow!("server banner missing socket: {trimmed}"));
    }
    Ok(addr.to_string())
}

async fn spawn_client(binary: &Path, addr: &str) -> Result<ClientProcess> {
    let mut cmd = Command::new(binary);
    cmd.arg("client")
        .arg("--server")
        .arg(addr)
        .env("RUST_LOG", "warn")
        .env("RUST_LOG_STYLE", "never")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = cmd.spawn().context("failed to spawn client")?;

    let stdin = child
        .stdin
        .take()
        .context("client stdin missing after spawn")?;
    let stdout = child
        .stdout
        .take()
        .context("client stdout missing after spawn")?;

    Ok(ClientProcess {
        child,
        stdin,
        stdout: BufReader::new(stdout),
    })
}

async fn expect_lines(client: &mut ClientProcess, expected: &[&str]) -> Result<()> {
    for want in expected {
        let got = read_line(&mut client.stdout)
            .await?
            .with_context(|| format!("stream closed while waiting for '{want}'"))?;
        if got != *want {
            return Err(anyhow!("expected '{want}', got '{got}'"));
        }
    }
    Ok(())
}

async fn read_line(reader: &mut BufReader<ChildStdout>) -> Result<Option<String>> {
    let mut line = String::new();
    let read_future = reader.read_line(&mut line);
    let bytes_io = match timeout(READ_TIMEOUT, read_future).await {
        Ok(result) => result,
        Err(_) => return Err(anyhow!("timed out waiting for line")),
    };
    let byte_count = bytes_io?;
    if byte_count == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

async fn drain_stdout(mut reader: BufReader<ChildStdout>) {
    let mut buffer = String::new();
    while reader
        .read_line(&mut buffer)
        .await
        .map(|bytes| {
            let has_data = bytes > 0;
            if has_data {
                buffer.clear();
            }
            has_data
        })
        .unwrap_or(false)
    {}
}

async fn ensure_success(process: ClientProcess, name: &str) -> Result<()> {
    let ClientProcess {
        mut child,
        stdin,
        stdout: _stdout,
    } = process;
    drop(stdin);

    let status = timeout(READ_TIMEOUT, child.wait())
        .await
        .with_context(|| format!("{name} did not exit after stdin closed"))?
        .with_context(|| format!("failed to await {name} process"))?;
    if !status.success() {
        return Err(anyhow!("{name} exited with status {status}"));
    }
    Ok(())
}
