use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::OutputMode;
use crate::credential::Credential;
use crate::error::{Result, SubgenError};
use crate::languages::{self, Language};
use crate::media::{MediaFile, ResourceHandle, ResourceStore};
use crate::progress::{LogListener, PipelineStatus, StatusListener};
use crate::subtitle::{format_srt, srt_to_vtt};
use crate::transcribe::SubtitleService;

const VTT_CONTENT_TYPE: &str = "text/vtt";

/// Result of a successful generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub mode: OutputMode,
    /// SRT text or plain transcript
    pub content: String,
    /// Download name: source base name plus `.srt`/`.txt`
    pub file_name: String,
    pub language: &'static Language,
    pub generated_at: DateTime<Local>,
}

impl PipelineOutput {
    /// Write the artifact into `dir`, returning its path.
    pub async fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.content).await?;

        info!(
            "Saved {} generated at {} to {}",
            self.mode,
            self.generated_at.to_rfc3339(),
            path.display()
        );
        Ok(path)
    }
}

/// Upload → transcribe → translate → format → preview controller.
///
/// Owns at most one media-preview handle and one subtitle-track handle; both
/// are released before being replaced and when the pipeline is dropped.
pub struct Pipeline {
    service: Box<dyn SubtitleService>,
    resources: Box<dyn ResourceStore>,
    listener: Box<dyn StatusListener>,
    credential: Option<Credential>,
    target_language: &'static Language,
    mode: OutputMode,
    status: PipelineStatus,
    status_message: String,
    file: Option<MediaFile>,
    output: Option<PipelineOutput>,
    error: Option<String>,
    media_preview: Option<ResourceHandle>,
    subtitle_track: Option<ResourceHandle>,
}

impl Pipeline {
    pub fn new(service: Box<dyn SubtitleService>, resources: Box<dyn ResourceStore>) -> Self {
        Self {
            service,
            resources,
            listener: Box::new(LogListener),
            credential: None,
            target_language: languages::original(),
            mode: OutputMode::default(),
            status: PipelineStatus::Idle,
            status_message: String::new(),
            file: None,
            output: None,
            error: None,
            media_preview: None,
            subtitle_track: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn StatusListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn set_target_language(&mut self, language: &'static Language) {
        self.target_language = language;
    }

    pub fn set_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn output(&self) -> Option<&PipelineOutput> {
        self.output.as_ref()
    }

    pub fn file(&self) -> Option<&MediaFile> {
        self.file.as_ref()
    }

    pub fn media_preview(&self) -> Option<&ResourceHandle> {
        self.media_preview.as_ref()
    }

    pub fn subtitle_track(&self) -> Option<&ResourceHandle> {
        self.subtitle_track.as_ref()
    }

    /// Handles currently held in the resource store.
    pub fn live_resources(&self) -> usize {
        self.resources.live_count()
    }

    /// Open `path` and select it; a rejected file leaves nothing selected.
    pub fn select_path<P: AsRef<Path>>(&mut self, path: P, mime_override: Option<&str>) -> Result<()> {
        match MediaFile::open(path, mime_override) {
            Ok(file) => self.select_file(Some(file)),
            Err(e) => {
                self.select_file(None)?;
                warn!("Rejected input: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the selected file, discarding any previous result.
    pub fn select_file(&mut self, file: Option<MediaFile>) -> Result<()> {
        self.status = PipelineStatus::Idle;
        self.status_message.clear();
        self.output = None;
        self.error = None;
        self.release_subtitle_track();
        self.release_media_preview();
        self.file = None;

        if let Some(file) = file {
            info!("Selected file: {}", file.path().display());
            self.media_preview = Some(self.resources.acquire_media(&file)?);
            self.file = Some(file);
        }
        Ok(())
    }

    /// Run one generation attempt for the selected file.
    pub async fn generate(&mut self) -> Result<&PipelineOutput> {
        if self.status == PipelineStatus::Processing {
            return Err(SubgenError::Busy);
        }

        let Some(file) = self.file.clone() else {
            return Err(self.refuse(SubgenError::NoFileSelected));
        };
        let Some(credential) = self.credential.clone() else {
            return Err(self.refuse(SubgenError::MissingCredential));
        };

        self.status = PipelineStatus::Processing;
        self.error = None;
        self.output = None;
        self.release_subtitle_track();

        match self.run(&file, &credential).await {
            Ok((output, track)) => {
                self.subtitle_track = track;
                let message = match output.mode {
                    OutputMode::Subtitles => "Subtitles generated successfully!",
                    OutputMode::Text => "Transcript generated successfully!",
                };
                self.publish(PipelineStatus::Success, message);
                Ok(&*self.output.insert(output))
            }
            Err(e) => {
                let message = e.to_string();
                self.error = Some(message.clone());
                self.publish(PipelineStatus::Error, &message);
                Err(e)
            }
        }
    }

    /// Release both handles. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.release_subtitle_track();
        self.release_media_preview();
    }

    /// Generated VTT text for the current preview track, if any.
    pub async fn preview_vtt(&self) -> Result<Option<String>> {
        match &self.subtitle_track {
            Some(track) => Ok(Some(fs::read_to_string(track.path()).await?)),
            None => Ok(None),
        }
    }

    async fn run(
        &mut self,
        file: &MediaFile,
        credential: &Credential,
    ) -> Result<(PipelineOutput, Option<ResourceHandle>)> {
        let language = self.target_language;
        let mode = self.mode;

        self.publish(PipelineStatus::Processing, "Converting file...");
        let audio = file.read_base64().await?;

        self.publish(PipelineStatus::Processing, "Transcribing audio...");
        let (content, track) = match mode {
            OutputMode::Subtitles => {
                let mut entries = self
                    .service
                    .transcribe_to_srt(&audio, file.mime_type(), credential)
                    .await?;

                if !language.is_original() {
                    self.publish(
                        PipelineStatus::Processing,
                        &format!("Translating to {}...", language.name),
                    );
                    entries = self
                        .service
                        .translate_subtitles(&entries, language.name, credential)
                        .await?;
                }

                self.publish(PipelineStatus::Processing, "Formatting subtitles...");
                let srt = format_srt(&entries);
                let vtt = srt_to_vtt(&srt);
                let track = self.resources.acquire_text(&vtt, VTT_CONTENT_TYPE)?;
                debug!("Preview track at {}", track.path().display());
                (srt, Some(track))
            }
            OutputMode::Text => {
                let mut text = self
                    .service
                    .transcribe_to_plain_text(&audio, file.mime_type(), credential)
                    .await?;

                if !language.is_original() {
                    self.publish(
                        PipelineStatus::Processing,
                        &format!("Translating to {}...", language.name),
                    );
                    text = self
                        .service
                        .translate_text(&text, language.name, credential)
                        .await?;
                }

                self.publish(PipelineStatus::Processing, "Formatting transcript...");
                (text.trim().to_string(), None)
            }
        };

        let output = PipelineOutput {
            mode,
            content,
            file_name: format!("{}.{}", file.base_name(), mode.extension()),
            language,
            generated_at: Local::now(),
        };
        Ok((output, track))
    }

    /// Record an input-validation error without entering `processing`.
    fn refuse(&mut self, error: SubgenError) -> SubgenError {
        warn!("Generation refused: {}", error);
        self.error = Some(error.to_string());
        error
    }

    fn publish(&mut self, status: PipelineStatus, message: &str) {
        self.status = status;
        self.status_message = message.to_string();
        self.listener.on_status(status, message);
    }

    fn release_subtitle_track(&mut self) {
        if let Some(handle) = self.subtitle_track.take() {
            self.resources.release(handle);
        }
    }

    fn release_media_preview(&mut self) {
        if let Some(handle) = self.media_preview.take() {
            self.resources.release(handle);
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::TempResourceStore;
    use crate::subtitle::SubtitleEntry;
    use crate::transcribe::MockSubtitleService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    type Events = Arc<Mutex<Vec<(PipelineStatus, String)>>>;

    struct Recorder(Events);

    impl StatusListener for Recorder {
        fn on_status(&self, status: PipelineStatus, message: &str) {
            self.0.lock().unwrap().push((status, message.to_string()));
        }
    }

    fn hello() -> Vec<SubtitleEntry> {
        vec![SubtitleEntry::new("00:00:00,000", "00:00:02,000", "Hello")]
    }

    fn media(dir: &TempDir, name: &str) -> MediaFile {
        let path = dir.path().join(name);
        std::fs::write(&path, b"RIFF").unwrap();
        MediaFile::open(&path, None).unwrap()
    }

    fn pipeline(service: MockSubtitleService) -> (Pipeline, Events) {
        let events: Events = Arc::default();
        let mut pipeline = Pipeline::new(
            Box::new(service),
            Box::new(TempResourceStore::new().unwrap()),
        )
        .with_listener(Box::new(Recorder(events.clone())));
        pipeline.set_credential(Credential::new("test-key"));
        (pipeline, events)
    }

    #[tokio::test]
    async fn test_generate_without_file_is_refused() {
        let (mut pipeline, events) = pipeline(MockSubtitleService::new());

        let err = pipeline.generate().await.unwrap_err();
        assert!(matches!(err, SubgenError::NoFileSelected));
        assert_eq!(pipeline.status(), PipelineStatus::Idle);
        assert_eq!(pipeline.error(), Some("Please select a file first."));
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_without_credential_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (mut pipeline, events) = pipeline(MockSubtitleService::new());
        pipeline.set_credential(None);
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let err = pipeline.generate().await.unwrap_err();
        assert!(matches!(err, SubgenError::MissingCredential));
        assert!(err.is_input_error());
        assert_eq!(pipeline.status(), PipelineStatus::Idle);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_original_language_skips_translation() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .withf(|audio, mime, credential| {
                audio == "UklGRg==" && mime == "audio/mpeg" && credential.expose() == "test-key"
            })
            .times(1)
            .returning(|_, _, _| Ok(hello()));
        service.expect_translate_subtitles().times(0);

        let (mut pipeline, events) = pipeline(service);
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let output = pipeline.generate().await.unwrap();
        assert_eq!(output.content, "1\n00:00:00,000 --> 00:00:02,000\nHello\n");
        assert_eq!(output.file_name, "talk.srt");
        assert!(output.language.is_original());

        assert_eq!(pipeline.status(), PipelineStatus::Success);
        assert_eq!(pipeline.status_message(), "Subtitles generated successfully!");
        assert_eq!(
            pipeline.preview_vtt().await.unwrap().as_deref(),
            Some("WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\nHello\n")
        );

        let messages: Vec<String> = events.lock().unwrap().iter().map(|(_, m)| m.clone()).collect();
        assert_eq!(
            messages,
            vec![
                "Converting file...",
                "Transcribing audio...",
                "Formatting subtitles...",
                "Subtitles generated successfully!",
            ]
        );
    }

    #[tokio::test]
    async fn test_translation_uses_language_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .times(1)
            .returning(|_, _, _| Ok(hello()));
        service
            .expect_translate_subtitles()
            .withf(|entries, language, _| entries.len() == 1 && language == "Japanese")
            .times(1)
            .returning(|_, _, _| Ok(vec![SubtitleEntry::new("00:00:00,000", "00:00:02,000", "こんにちは")]));

        let (mut pipeline, events) = pipeline(service);
        pipeline.set_target_language(languages::find("ja").unwrap());
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let output = pipeline.generate().await.unwrap();
        assert!(output.content.contains("こんにちは"));
        assert!(
            events
                .lock()
                .unwrap()
                .iter()
                .any(|(_, m)| m == "Translating to Japanese...")
        );
    }

    #[tokio::test]
    async fn test_transcription_failure_enters_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .times(1)
            .returning(|_, _, _| Err(SubgenError::Transcription("bad reply".to_string())));
        service.expect_translate_subtitles().times(0);

        let (mut pipeline, events) = pipeline(service);
        pipeline.set_target_language(languages::find("fr").unwrap());
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        assert!(pipeline.generate().await.is_err());
        assert_eq!(pipeline.status(), PipelineStatus::Error);
        assert_eq!(pipeline.error(), Some("Audio transcription failed: bad reply"));
        assert_eq!(pipeline.status_message(), "Audio transcription failed: bad reply");
        assert!(pipeline.output().is_none());
        assert!(pipeline.subtitle_track().is_none());
        assert_eq!(pipeline.live_resources(), 1);
        assert_eq!(
            events.lock().unwrap().last().unwrap().0,
            PipelineStatus::Error
        );
    }

    #[tokio::test]
    async fn test_translation_failure_discards_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .times(1)
            .returning(|_, _, _| Ok(hello()));
        service
            .expect_translate_subtitles()
            .times(1)
            .returning(|_, _, _| Err(SubgenError::Translation("expected 1 entries, got 0".to_string())));

        let (mut pipeline, _) = pipeline(service);
        pipeline.set_target_language(languages::find("de").unwrap());
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let err = pipeline.generate().await.unwrap_err();
        assert!(matches!(err, SubgenError::Translation(_)));
        assert_eq!(pipeline.status(), PipelineStatus::Error);
        assert!(pipeline.output().is_none());
        assert!(pipeline.subtitle_track().is_none());
    }

    #[tokio::test]
    async fn test_repeated_generation_does_not_leak_handles() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .times(3)
            .returning(|_, _, _| Ok(hello()));

        let (mut pipeline, _) = pipeline(service);
        pipeline.select_file(Some(media(&dir, "one.wav"))).unwrap();
        assert_eq!(pipeline.live_resources(), 1);

        pipeline.generate().await.unwrap();
        let first_track = pipeline.subtitle_track().unwrap().path().to_path_buf();
        pipeline.generate().await.unwrap();
        assert_eq!(pipeline.live_resources(), 2);
        assert!(!first_track.exists());

        pipeline.select_file(Some(media(&dir, "two.mp4"))).unwrap();
        assert_eq!(pipeline.live_resources(), 1);
        assert!(pipeline.subtitle_track().is_none());
        assert!(pipeline.output().is_none());
        assert_eq!(pipeline.status(), PipelineStatus::Idle);

        pipeline.generate().await.unwrap();
        assert_eq!(pipeline.output().unwrap().file_name, "two.srt");

        pipeline.shutdown();
        assert_eq!(pipeline.live_resources(), 0);
        pipeline.shutdown();
        assert_eq!(pipeline.live_resources(), 0);
    }

    #[tokio::test]
    async fn test_text_mode_translates_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_plain_text()
            .times(1)
            .returning(|_, _, _| Ok("Good morning everyone.".to_string()));
        service
            .expect_translate_text()
            .withf(|text, language, _| text == "Good morning everyone." && language == "Spanish")
            .times(1)
            .returning(|_, _, _| Ok("Buenos días a todos.".to_string()));
        service.expect_transcribe_to_srt().times(0);

        let (mut pipeline, _) = pipeline(service);
        pipeline.set_mode(OutputMode::Text);
        pipeline.set_target_language(languages::find("es").unwrap());
        pipeline.select_file(Some(media(&dir, "meeting.m4a"))).unwrap();

        let output = pipeline.generate().await.unwrap();
        assert_eq!(output.content, "Buenos días a todos.");
        assert_eq!(output.file_name, "meeting.txt");
        assert!(pipeline.subtitle_track().is_none());
        assert_eq!(pipeline.preview_vtt().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_select_rejects_non_media_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let (mut pipeline, _) = pipeline(MockSubtitleService::new());
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let err = pipeline.select_path(&path, None).unwrap_err();
        assert!(matches!(err, SubgenError::UnsupportedMedia(_)));
        assert!(pipeline.file().is_none());
        assert!(pipeline.media_preview().is_none());
        assert_eq!(pipeline.live_resources(), 0);
        assert_eq!(pipeline.status(), PipelineStatus::Idle);
        assert!(pipeline.error().is_some());
    }

    #[tokio::test]
    async fn test_output_is_saved_under_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = MockSubtitleService::new();
        service
            .expect_transcribe_to_srt()
            .times(1)
            .returning(|_, _, _| Ok(hello()));

        let (mut pipeline, _) = pipeline(service);
        pipeline.select_file(Some(media(&dir, "lecture.webm"))).unwrap();
        let before = Local::now();
        let output = pipeline.generate().await.unwrap().clone();
        assert!(output.generated_at >= before && output.generated_at <= Local::now());

        let out_dir = dir.path().join("out");
        let path = output.save_to(&out_dir).await.unwrap();
        assert_eq!(path, out_dir.join("lecture.srt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), output.content);
    }

    /// Service whose transcription never completes.
    struct StalledService {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SubtitleService for StalledService {
        async fn transcribe_to_srt(
            &self,
            _audio_base64: &str,
            _mime_type: &str,
            _credential: &Credential,
        ) -> Result<Vec<SubtitleEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn transcribe_to_plain_text(
            &self,
            _audio_base64: &str,
            _mime_type: &str,
            _credential: &Credential,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn translate_subtitles(
            &self,
            _entries: &[SubtitleEntry],
            _target_language: &str,
            _credential: &Credential,
        ) -> Result<Vec<SubtitleEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn translate_text(
            &self,
            _text: &str,
            _target_language: &str,
            _credential: &Credential,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_abandoned_attempt_stays_busy_until_reselect() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = Pipeline::new(
            Box::new(StalledService { calls: calls.clone() }),
            Box::new(TempResourceStore::new().unwrap()),
        );
        pipeline.set_credential(Credential::new("test-key"));
        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();

        let attempt = tokio::time::timeout(Duration::from_millis(50), pipeline.generate()).await;
        assert!(attempt.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.status(), PipelineStatus::Processing);
        assert_eq!(pipeline.status_message(), "Transcribing audio...");

        let err = pipeline.generate().await.unwrap_err();
        assert!(matches!(err, SubgenError::Busy));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(pipeline.output().is_none());

        pipeline.select_file(Some(media(&dir, "talk.mp3"))).unwrap();
        assert_eq!(pipeline.status(), PipelineStatus::Idle);
        assert_eq!(pipeline.status_message(), "");
    }
}
