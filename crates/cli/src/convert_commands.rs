use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    anyhow::{Context, Result},
    clap::Args,
    msgbridge_config::BridgeConfig,
    msgbridge_media::{FfmpegTranscoder, LocalMediaStore},
    msgbridge_msgconv::{
        ConvertContext, ConvertOptions, InboundMessage, Jid, UriMediaSource, to_destination,
    },
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

#[derive(Args)]
pub struct ConvertArgs {
    /// Inbound message as JSON.
    pub message: PathBuf,

    /// Destination conversation, as `user@server`.
    #[arg(long)]
    pub conversation: Jid,

    /// The body was already formatted by a relay; skip emote prefixing.
    #[arg(long, default_value_t = false)]
    pub relay_formatted: bool,
}

pub async fn handle_convert(args: &ConvertArgs, config: &BridgeConfig) -> Result<()> {
    let mut msg = read_message(&args.message).await?;

    let store_dir = config.store.resolve_dir();
    let cancel = CancellationToken::new();
    let ctx = build_context(args, config, &store_dir).with_cancel(cancel.clone());

    let deadline = Duration::from_secs(config.media.transcode_timeout_secs);
    let watchdog = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("interrupted, cancelling conversion"),
            () = tokio::time::sleep(deadline) => {
                warn!(secs = deadline.as_secs(), "conversion timed out");
            },
        }
        cancel.cancel();
    });

    let result = to_destination(&mut msg, &ctx, ConvertOptions {
        relay_formatted: args.relay_formatted,
    })
    .await;
    watchdog.abort();

    let envelope = result.context("conversion failed")?;
    info!(
        content = envelope.content.kind(),
        store = %store_dir.display(),
        "converted"
    );
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn build_context(args: &ConvertArgs, config: &BridgeConfig, store_dir: &Path) -> ConvertContext {
    let ctx = ConvertContext::new(
        Arc::new(UriMediaSource {
            max_bytes: config.media.max_download_bytes,
        }),
        Arc::new(FfmpegTranscoder::new(config.media.ffmpeg_path.clone())),
        Arc::new(LocalMediaStore::new(store_dir)),
        args.conversation.clone(),
    );
    match &config.destination.server {
        Some(server) => ctx.with_destination_server(server),
        None => ctx,
    }
}

async fn read_message(path: &Path) -> Result<InboundMessage> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid message in {}", path.display()))
}
