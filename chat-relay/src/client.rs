use anyhow::{Context, Result};
use tokio::{
    io::{self, AsyncWrite, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    select,
};
use tracing::{info, warn};

use crate::cli::ClientArgs;

/// Relays stdin to the server and the server to stdout, byte for byte.
pub async fn run(args: ClientArgs) -> Result<()> {
    let (reader, writer) = establish_connection(&args).await?;
    run_client_loop(reader, writer).await
}

async fn establish_connection(args: &ClientArgs) -> Result<(OwnedReadHalf, OwnedWriteHalf)> {
    let stream = TcpStream::connect(args.server)
        .await
        .with_context(|| format!("failed to connect to {}", args.server))?;

    info!("connected to {}", args.server);
    Ok(stream.into_split())
}

async fn run_client_loop(mut reader: OwnedReadHalf, mut writer: OwnedWriteHalf) -> Result<()> {
    let downstream = async {
        let mut stdout = io::stdout();
        io::copy(&mut reader, &mut stdout)
            .await
            .context("failed to relay server output")
    };
    let upstream = async {
        let mut stdin = io::stdin();
        io::copy(&mut stdin, &mut writer)
            .await
            .context("failed to relay stdin")?;
        shutdown_connection(&mut writer).await;
        Ok::<_, anyhow::Error>(())
    };
    tokio::pin!(downstream, upstream);

    select! {
        result = &mut downstream => {
            result?;
        }
        result = &mut upstream => {
            // Stdin is done; keep printing until the server hangs up.
            result?;
            downstream.await?;
        }
        ctrl_c = tokio::signal::ctrl_c() => handle_ctrl_c(ctrl_c),
    }

    Ok(())
}

fn handle_ctrl_c(result: io::Result<()>) {
    if let Err(error) = result {
        warn!(?error, "ctrl-c handler failed");
    }
}

async fn shutdown_connection<W>(writer: &mut W)
where
    W: AsyncWrite + Unpin,
{
    if let Err(error) = writer.shutdown().await {
        warn!(?error, "failed to shutdown client writer cleanly");
    }
}
