// K League dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load CSVs and initialize the dataset
// 4. Print the dashboard view for the configured selection as JSON
// 5. Chat with the team's manager over stdin until EOF or /quit

use std::io::{IsTerminal, Write};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use kleague_app::dashboard::DashboardExport;
use kleague_app::dataset::Dataset;
use kleague_core::config;
use kleague_llm::chat::ChatSession;
use kleague_llm::client::LlmClient;
use kleague_llm::prompt::Persona;

const QUIT_COMMAND: &str = "/quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("K League dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: team={}, mode={:?}, model={}",
        config.selection.team, config.selection.mode, config.llm.model
    );

    // 3. Load data
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let dataset = Dataset::load(&base_dir, &config.data).context("failed to load match data")?;
    if dataset.is_empty() {
        warn!("event data is empty; views will be blank");
    }

    // 4. Dashboard view
    let export = DashboardExport::compose(&dataset, &config.managers, &config.selection);
    if export.view.is_none() {
        warn!("no view for selection {:?}", config.selection);
    }
    let json = serde_json::to_string_pretty(&export).context("failed to serialize dashboard")?;
    println!("{json}");

    // 5. Chat
    let context = export.view.as_ref().and_then(|v| v.match_context());
    let date = config
        .selection
        .match_id
        .as_deref()
        .filter(|_| context.is_some())
        .and_then(|id| dataset.fixture(id))
        .and_then(|f| f.date);
    let persona = Persona::resolve(&config, &config.selection.team, date, context);
    info!(manager = persona.manager.as_str(), "chat persona ready");

    let client = LlmClient::from_config(&config);
    match &client {
        LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }

    let mut session = ChatSession::new(persona, config.llm.history_window);
    run_chat(&mut session, &client, config.llm.max_tokens).await?;

    info!("K League dashboard shut down cleanly");
    Ok(())
}

/// Read questions line by line and stream each answer to stdout.
async fn run_chat(session: &mut ChatSession, client: &LlmClient, max_tokens: u32) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if interactive {
        eprintln!(
            "{} 감독에게 질문하세요 ({QUIT_COMMAND} 로 종료)",
            session.persona().manager
        );
    }

    loop {
        if interactive {
            eprint!("> ");
            std::io::stderr().flush().ok();
        }
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == QUIT_COMMAND {
            break;
        }

        let mut stdout = std::io::stdout();
        let reply = session
            .ask(client, question, max_tokens, |token| {
                let _ = write!(stdout, "{token}");
                let _ = stdout.flush();
            })
            .await?;
        if let kleague_llm::chat::ChatReply::Failed { .. } = &reply {
            print!("{}", reply.transcript_text());
        }
        println!();
    }
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which carries the chat).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("kleague.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("kleague_app=info,kleague_core=info,kleague_llm=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
