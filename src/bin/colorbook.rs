//! CLI for Colorbook - coloring-book pages from text prompts.

use clap::{Args, Parser, Subcommand};
use colorbook::image::ImageProvider;
use colorbook::{
    Gallery, GeneratedImage, GenerationWorkflow, HuggingFaceProvider, Rejection, Submission,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TITLE: &str = "Sample Generator";

#[derive(Parser)]
#[command(name = "colorbook")]
#[command(about = "Turn text prompts into coloring-book pages via Hugging Face inference")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Model repository id
    #[arg(long, global = true, env = "COLORBOOK_MODEL")]
    model: Option<String>,

    /// Inference API root (defaults to the hosted Hugging Face API)
    #[arg(long, global = true, env = "COLORBOOK_ENDPOINT")]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: up to three pages, then review or purchase
    Session(SessionArgs),

    /// Generate a single page and write it to a file
    Generate(GenerateArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Directory to export accepted pages into
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the page
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorbook=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let provider = build_provider(&cli)?;

    match cli.command {
        Commands::Session(args) => run_session(provider, args, cli.json).await?,
        Commands::Generate(args) => generate_page(provider, args, cli.json).await?,
    }

    Ok(())
}

fn build_provider(cli: &Cli) -> anyhow::Result<Arc<HuggingFaceProvider>> {
    let mut builder = HuggingFaceProvider::builder();
    if let Some(model) = cli.model.as_deref() {
        builder = builder.model(model);
    }
    if let Some(endpoint) = cli.endpoint.as_deref() {
        builder = builder.base_url(endpoint);
    }
    Ok(Arc::new(builder.build()?))
}

async fn generate_page(
    provider: Arc<HuggingFaceProvider>,
    args: GenerateArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut session = GenerationWorkflow::new(provider);
    session.set_prompt(&args.prompt);

    let index = match session.submit_prompt().await? {
        Submission::Generated { index } => index,
        Submission::Failed { message } => anyhow::bail!("Error: {message}"),
    };
    let Some(image) = session.gallery().get(index) else {
        anyhow::bail!("generated page {index} missing from gallery");
    };

    image.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format().extension(),
            "provider": image.provider().to_string(),
            "model": image.metadata().model,
            "duration_ms": image.metadata().duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated page: {} ({} bytes) via {}",
            args.output.display(),
            image.size(),
            session.provider().name()
        );
        if let Some(duration) = image.metadata().duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

/// Terminal rendering of the session views.
struct Screen {
    json: bool,
    save_dir: Option<PathBuf>,
}

impl Screen {
    fn emit(&self, event: &str, text: &str, extra: serde_json::Value) {
        if self.json {
            let mut value = serde_json::json!({ "event": event, "message": text });
            if let (Some(obj), serde_json::Value::Object(extra)) = (value.as_object_mut(), extra) {
                obj.extend(extra);
            }
            println!("{value}");
        } else {
            println!("{text}");
        }
    }

    fn status(&self, session: &GenerationWorkflow<Arc<HuggingFaceProvider>>) {
        let text = format!(
            "[{}]{} {}/{} pages",
            session.button_label(),
            if session.is_input_disabled() {
                " (input disabled)"
            } else {
                ""
            },
            session.gallery().len(),
            colorbook::GALLERY_CAPACITY,
        );
        self.emit(
            "status",
            &text,
            serde_json::json!({
                "button_label": session.button_label(),
                "input_disabled": session.is_input_disabled(),
                "pages": session.gallery().len(),
                "last_error": session.last_error(),
            }),
        );
    }

    fn alert(&self, rejection: Rejection) {
        self.emit("alert", &rejection.to_string(), serde_json::Value::Null);
    }

    /// Writes the page into `--save-dir`, if one was given.
    fn export(&self, index: usize, image: &GeneratedImage) -> anyhow::Result<Option<PathBuf>> {
        let Some(dir) = &self.save_dir else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("page-{}.{}", index + 1, image.format().extension()));
        image.save(&path)?;
        Ok(Some(path))
    }

    /// Shows a gallery entry. A failed export is reported but the page stays in the session.
    fn page(&self, index: usize, image: &GeneratedImage) {
        let saved = match self.export(index, image) {
            Ok(path) => path.map(|p| p.display().to_string()),
            Err(err) => {
                tracing::warn!(index, error = %err, "failed to export page");
                self.emit(
                    "error",
                    &format!("Error: could not save {}: {err}", Gallery::alt_text(index)),
                    serde_json::Value::Null,
                );
                None
            }
        };

        let mut text = format!(
            "{}: {} bytes ({})",
            Gallery::alt_text(index),
            image.size(),
            image.format().extension()
        );
        if let Some(path) = &saved {
            text.push_str(&format!(" -> {path}"));
        }
        self.emit(
            "generated",
            &text,
            serde_json::json!({
                "index": index,
                "size_bytes": image.size(),
                "format": image.format().extension(),
                "saved": saved,
            }),
        );
    }

    fn review_prompt(&self) {
        self.emit(
            "review",
            "Review Coloring Book: type :review or :purchase",
            serde_json::Value::Null,
        );
    }
}

async fn run_session(
    provider: Arc<HuggingFaceProvider>,
    args: SessionArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let screen = Screen {
        json: json_output,
        save_dir: args.save_dir,
    };
    let mut session = GenerationWorkflow::new(provider);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    screen.emit("title", TITLE, serde_json::Value::Null);
    screen.emit(
        "help",
        "Describe your image and press enter. Commands: :status :review :purchase :quit",
        serde_json::Value::Null,
    );
    screen.status(&session);

    loop {
        tokio::select! {
            Some(result) = rx.recv() => {
                finish(&mut session, &screen, result);
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    // An unreadable stdin cannot recover; end input like EOF.
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read input");
                        screen.emit(
                            "error",
                            &format!("Error: input closed: {err}"),
                            serde_json::Value::Null,
                        );
                        break;
                    }
                };

                match line.trim() {
                    ":quit" | ":q" => break,
                    ":status" => screen.status(&session),
                    ":review" => match session.review() {
                        Ok(notice) => screen.emit("review", notice, serde_json::Value::Null),
                        Err(rejection) => screen.alert(rejection),
                    },
                    ":purchase" => match session.purchase() {
                        Ok(notice) => screen.emit("purchase", notice, serde_json::Value::Null),
                        Err(rejection) => screen.alert(rejection),
                    },
                    _ => {
                        session.set_prompt(line.clone());
                        match session.begin() {
                            Ok(request) => {
                                let provider = Arc::clone(session.provider());
                                let tx = tx.clone();
                                tokio::spawn(async move {
                                    let _ = tx.send(provider.generate(&request).await);
                                });
                                screen.status(&session);
                            }
                            Err(rejection) => screen.alert(rejection),
                        }
                    }
                }
            }
        }
    }

    // Let an in-flight request land before exiting.
    if session.is_busy() {
        if let Some(result) = rx.recv().await {
            finish(&mut session, &screen, result);
        }
    }

    Ok(())
}

fn finish(
    session: &mut GenerationWorkflow<Arc<HuggingFaceProvider>>,
    screen: &Screen,
    result: colorbook::Result<GeneratedImage>,
) {
    match session.complete(result) {
        Submission::Generated { index } => {
            if let Some(image) = session.gallery().get(index) {
                screen.page(index, image);
            }
        }
        Submission::Failed { .. } => {
            if let Some(banner) = session.error_banner() {
                screen.emit("error", &banner, serde_json::Value::Null);
            }
        }
    }

    screen.status(session);
    if session.show_review_prompt() {
        screen.review_prompt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorbook::{GenerationMetadata, ImageFormat, ImageProviderKind};

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn page_image() -> GeneratedImage {
        GeneratedImage::new(
            PNG.to_vec(),
            ImageFormat::Png,
            ImageProviderKind::HuggingFace,
            GenerationMetadata::default(),
        )
    }

    fn session() -> GenerationWorkflow<Arc<HuggingFaceProvider>> {
        let provider = HuggingFaceProvider::builder()
            .api_key("hf-test")
            .build()
            .unwrap();
        let mut session = GenerationWorkflow::new(Arc::new(provider));
        session.set_prompt("a cat");
        session
    }

    #[test]
    fn test_export_writes_numbered_page() {
        let dir = tempfile::tempdir().unwrap();
        let screen = Screen {
            json: false,
            save_dir: Some(dir.path().join("pages")),
        };

        let path = screen.export(1, &page_image()).unwrap().unwrap();

        assert_eq!(path, dir.path().join("pages").join("page-2.png"));
        assert_eq!(std::fs::read(&path).unwrap(), PNG);
    }

    #[test]
    fn test_export_without_save_dir_writes_nothing() {
        let screen = Screen {
            json: false,
            save_dir: None,
        };
        assert!(screen.export(0, &page_image()).unwrap().is_none());
    }

    #[test]
    fn test_failed_export_keeps_session_going() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        std::fs::write(&blocker, b"occupied").unwrap();
        let screen = Screen {
            json: true,
            save_dir: Some(blocker),
        };
        assert!(screen.export(0, &page_image()).is_err());

        let mut session = session();
        session.begin().unwrap();
        finish(&mut session, &screen, Ok(page_image()));

        assert_eq!(session.gallery().len(), 1);
        assert!(!session.is_busy());
        assert!(session.last_error().is_none());

        session.set_prompt("a dog");
        assert!(session.begin().is_ok());
    }
}
