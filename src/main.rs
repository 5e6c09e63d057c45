// One-shot entry point: authenticate, run the pipeline once, report, exit.

use google_gmail1::api::Scope;
use mailbrief::{Config, GeminiClient, GmailMailbox, Pipeline, TelegramNotifier, Workflow};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    // Load environment variables from a .env file, if present.
    dotenv::dotenv().ok();

    // Initialize the logger.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    // The polling deployment only reads; the label workflow needs to write
    // labels back.
    let scopes = match &config.workflow {
        Workflow::PollUnread => vec![Scope::Readonly],
        Workflow::Labels { .. } => vec![Scope::Modify],
    };
    let summary_mode = config.workflow.summary_mode();

    // Authentication failure is fatal before any mail, summary, or chat
    // side effect.
    let mailbox = match GmailMailbox::connect(&config.auth, &scopes).await {
        Ok(mailbox) => mailbox,
        Err(e) => {
            error!(error = %e, "mailbox authentication failed");
            std::process::exit(1);
        }
    };

    let summarizer = match GeminiClient::new(&config.gemini_api_key, summary_mode) {
        Ok(summarizer) => summarizer,
        Err(e) => {
            error!(error = %e, "failed to build the summarizer client");
            std::process::exit(1);
        }
    };

    let notifier = TelegramNotifier::new(&config.telegram_token, config.telegram_chat_id);

    let pipeline = Pipeline::new(
        Box::new(mailbox),
        Box::new(summarizer),
        Box::new(notifier),
        config.workflow,
    );

    match pipeline.run().await {
        Ok(report) => {
            for failure in &report.failures {
                warn!(
                    message_id = %failure.message_id,
                    stage = %failure.stage,
                    detail = %failure.detail,
                    "message was not fully processed"
                );
            }
            info!(
                discovered = report.discovered,
                notified = report.notified,
                failed = report.failures.len(),
                "run complete"
            );
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            std::process::exit(1);
        }
    }
}
