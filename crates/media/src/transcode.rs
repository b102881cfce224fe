//! ffmpeg-backed transcoding.
//!
//! Two conversions exist, both producing MP4 containers the destination
//! clients can play natively:
//! - voice notes become mono AAC audio (`.m4a`),
//! - animated images become H.264 video with even pixel dimensions and the
//!   `moov` atom moved to the front (`+faststart`).
//!
//! ffmpeg needs seekable files for MP4 output, so input and output go
//! through a temporary directory rather than pipes.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use {
    tokio::process::Command,
    tracing::{debug, warn},
};

use crate::error::{Context, Error, Result};

/// Binary name looked up in `PATH` when no explicit path is configured.
const BINARY_NAME: &str = "ffmpeg";

/// A conversion the pipeline can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Voice message to mono AAC in an MP4 container.
    VoiceNote,
    /// Animated image (GIF) to H.264 MP4 video.
    AnimatedImage,
}

impl Profile {
    /// File extension of the produced container, with the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::VoiceNote => ".m4a",
            Self::AnimatedImage => ".mp4",
        }
    }

    /// MIME type of the produced container.
    #[must_use]
    pub fn output_mime(self) -> &'static str {
        match self {
            Self::VoiceNote => "audio/mp4",
            Self::AnimatedImage => "video/mp4",
        }
    }

    fn input_args(self) -> &'static [&'static str] {
        match self {
            Self::VoiceNote => &[],
            Self::AnimatedImage => &["-f", "gif"],
        }
    }

    fn output_args(self) -> &'static [&'static str] {
        match self {
            Self::VoiceNote => &["-vn", "-ac", "1", "-c:a", "aac"],
            Self::AnimatedImage => &[
                "-pix_fmt",
                "yuv420p",
                "-c:v",
                "libx264",
                "-movflags",
                "+faststart",
                "-filter:v",
                "crop='floor(in_w/2)*2:floor(in_h/2)*2'",
            ],
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VoiceNote => f.write_str("voice note"),
            Self::AnimatedImage => f.write_str("animated image"),
        }
    }
}

/// Runs the external ffmpeg utility.
#[derive(Clone, Debug, Default)]
pub struct FfmpegTranscoder {
    binary_path: Option<PathBuf>,
}

impl FfmpegTranscoder {
    /// Create a transcoder, optionally pinned to a specific ffmpeg binary.
    #[must_use]
    pub fn new(binary_path: Option<PathBuf>) -> Self {
        Self { binary_path }
    }

    /// Resolve the ffmpeg binary: explicit path first, then `PATH`.
    pub fn find_binary(&self) -> Option<PathBuf> {
        if let Some(path) = &self.binary_path
            && path.is_file()
        {
            return Some(path.clone());
        }
        which::which(BINARY_NAME).ok()
    }

    /// Convert `data` according to `profile`.
    ///
    /// The child process is killed if the returned future is dropped, so
    /// racing this against a cancellation signal does not leak ffmpeg runs.
    pub async fn transcode(
        &self,
        data: &[u8],
        input_mime: &str,
        profile: Profile,
    ) -> Result<Vec<u8>> {
        let binary = self
            .find_binary()
            .ok_or_else(|| Error::invalid_input("ffmpeg binary not found in PATH"))?;

        let dir = tempfile::tempdir().context("failed to create transcode directory")?;
        let input = dir.path().join(format!("input{}", input_extension(input_mime)));
        let output = dir.path().join(format!("output{}", profile.extension()));
        tokio::fs::write(&input, data)
            .await
            .context("failed to write transcode input")?;

        debug!(%profile, input_mime, bytes = data.len(), "starting ffmpeg");
        run_ffmpeg(&binary, &input, &output, profile).await?;

        let converted = tokio::fs::read(&output)
            .await
            .context("failed to read transcode output")?;
        debug!(%profile, bytes = converted.len(), "ffmpeg finished");
        Ok(converted)
    }
}

async fn run_ffmpeg(binary: &Path, input: &Path, output: &Path, profile: Profile) -> Result<()> {
    let mut cmd = Command::new(binary);
    cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(profile.input_args())
        .arg("-i")
        .arg(input)
        .args(profile.output_args())
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let result = cmd.output().await.context("failed to execute ffmpeg")?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!(%profile, status = %result.status, "ffmpeg exited with an error");
        return Err(Error::Message(format!(
            "ffmpeg failed ({}): {}",
            result.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Input file extension hint so ffmpeg's probing picks the right demuxer.
fn input_extension(mime: &str) -> &'static str {
    match mime {
        "image/gif" => ".gif",
        "audio/ogg" => ".ogg",
        "audio/mpeg" => ".mp3",
        "audio/mp4" => ".m4a",
        "audio/webm" | "video/webm" => ".webm",
        "audio/wav" | "audio/x-wav" => ".wav",
        _ => ".bin",
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn voice_profile_produces_mono_aac() {
        let args = Profile::VoiceNote.output_args();
        assert!(args.windows(2).any(|w| w == ["-ac", "1"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert_eq!(Profile::VoiceNote.extension(), ".m4a");
        assert_eq!(Profile::VoiceNote.output_mime(), "audio/mp4");
    }

    #[test]
    fn animation_profile_crops_to_even_and_fast_starts() {
        let args = Profile::AnimatedImage.output_args();
        assert!(args.windows(2).any(|w| w == ["-movflags", "+faststart"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.iter().any(|a| a.contains("floor(in_w/2)*2")));
        assert_eq!(Profile::AnimatedImage.input_args(), ["-f", "gif"]);
        assert_eq!(Profile::AnimatedImage.output_mime(), "video/mp4");
    }

    #[rstest]
    #[case("image/gif", ".gif")]
    #[case("audio/ogg", ".ogg")]
    #[case("application/x-unknown", ".bin")]
    fn input_extension_hints(#[case] mime: &str, #[case] ext: &str) {
        assert_eq!(input_extension(mime), ext);
    }

    #[test]
    fn explicit_missing_binary_falls_back_to_path() {
        let transcoder = FfmpegTranscoder::new(Some("/nonexistent/ffmpeg".into()));
        assert_eq!(transcoder.find_binary(), which::which(BINARY_NAME).ok());
    }

    #[tokio::test]
    async fn failing_binary_reports_status() {
        // `false` ignores its arguments and exits non-zero.
        let Ok(false_bin) = which::which("false") else {
            return;
        };
        let transcoder = FfmpegTranscoder::new(Some(false_bin));
        let err = transcoder
            .transcode(b"GIF89a", "image/gif", Profile::AnimatedImage)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ffmpeg failed"));
    }
}
