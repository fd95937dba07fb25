use civic_triage::utils::error::ErrorSeverity;
use civic_triage::utils::{logger, validation::Validate};
use civic_triage::{
    CliConfig, FfmpegFrameExtractor, GeminiVisionClient, IssueStore, MediaTriagePipeline, Result,
    Submission, SupabaseBlobStore, SupabaseIssueStore, TriageConfig, TriageEngine,
    WhisperCliTranscriber,
};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);

    tracing::info!("Starting civic-triage CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證旗標組合
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ civic-triage failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<()> {
    // 配置:有檔案用檔案,沒有就讀環境變數
    let config = match &cli.config {
        Some(path) => TriageConfig::from_file(path)?,
        None => TriageConfig::from_env()?,
    };
    config.validate()?;

    let blob = SupabaseBlobStore::with_bucket(
        &config.supabase.url,
        &config.supabase.service_key,
        config.bucket(),
    );
    let transcriber = build_transcriber(&config);
    let frames = build_frame_extractor(&config);
    let vision = build_vision_client(&config);
    let store = SupabaseIssueStore::with_table(
        &config.supabase.url,
        &config.supabase.service_key,
        config.table(),
    );

    if cli.check {
        return check(&transcriber, &frames).await;
    }

    if cli.list {
        let issues = store.list_recent(cli.limit as usize).await?;
        println!("{}", serde_json::to_string_pretty(&issues)?);
        tracing::info!("📋 Listed {} stored issues", issues.len());
        return Ok(());
    }

    // 剩下的就是 --input
    let input_path = cli.input.as_deref().unwrap_or_default();
    let raw = std::fs::read_to_string(input_path)?;
    let submission: Submission = serde_json::from_str(&raw)?;

    let pipeline = MediaTriagePipeline::new(blob, transcriber, frames, vision);
    let engine = TriageEngine::new_with_monitoring(pipeline, cli.monitor);

    if cli.dry_run {
        let issue = engine.process(&submission).await?;
        println!("{}", serde_json::to_string_pretty(&issue)?);
        tracing::info!("✅ Dry run complete (nothing persisted)");
    } else {
        let stored = engine.submit(&submission, &store).await?;
        println!("{}", serde_json::to_string_pretty(&stored)?);
        tracing::info!("✅ Issue {} stored", stored.id);
    }

    Ok(())
}

fn build_transcriber(config: &TriageConfig) -> WhisperCliTranscriber {
    match &config.transcriber {
        Some(section) => {
            let mut transcriber = WhisperCliTranscriber::new(&section.model_path);
            if let Some(binary) = &section.binary {
                transcriber = transcriber.with_binary(binary);
            }
            if let Some(seconds) = section.timeout_seconds {
                transcriber = transcriber.with_timeout(Duration::from_secs(seconds));
            }
            transcriber
        }
        None => WhisperCliTranscriber::new("models/ggml-base.bin"),
    }
}

fn build_frame_extractor(config: &TriageConfig) -> FfmpegFrameExtractor {
    match &config.frames {
        Some(section) => {
            let mut frames = match &section.binary {
                Some(binary) => FfmpegFrameExtractor::with_binary(binary),
                None => FfmpegFrameExtractor::new(),
            };
            if let Some(seconds) = section.timeout_seconds {
                frames = frames.with_timeout(Duration::from_secs(seconds));
            }
            frames
        }
        None => FfmpegFrameExtractor::new(),
    }
}

fn build_vision_client(config: &TriageConfig) -> GeminiVisionClient {
    let mut vision = match &config.gemini.endpoint {
        Some(endpoint) => GeminiVisionClient::with_endpoint(endpoint, &config.gemini.api_key),
        None => GeminiVisionClient::new(&config.gemini.api_key),
    };
    if let Some(model) = &config.gemini.model {
        vision = vision.with_model(model);
    }
    vision
}

async fn check(transcriber: &WhisperCliTranscriber, frames: &FfmpegFrameExtractor) -> Result<()> {
    use civic_triage::{FrameExtractor, Transcriber};

    let ffmpeg_ok = frames.is_available().await;
    let whisper_ok = transcriber.is_available().await;

    println!(
        "frame extraction: {}",
        if ffmpeg_ok { "✅ available" } else { "❌ unavailable" }
    );
    println!(
        "transcription:    {}",
        if whisper_ok { "✅ available" } else { "❌ unavailable" }
    );
    println!("configuration:    ✅ valid");

    if !ffmpeg_ok {
        tracing::warn!("⚠️ ffmpeg not found; video submissions will degrade to defaults");
    }
    if !whisper_ok {
        tracing::warn!("⚠️ transcriber not ready; audio submissions will keep their description");
    }

    Ok(())
}
