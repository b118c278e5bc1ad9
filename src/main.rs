use anyhow::Result;
use clap::Parser;
use colored::*;
use std::env;
use std::sync::Arc;

use spchat_cli::{
    display_banner, handle_input_with_history, print_documents, print_error, print_help,
    print_message, print_status, prompt_credential, prompt_secret, ChatEngine,
};
use spchat_core::{DocumentConnector, Error, LLMProvider, RetrievalEngine, Session, VectorStore};
use spchat_openai::OpenAiClient;
use spchat_rag::{LocalDocumentIndexer, LocalRetrievalEngine, LocalVectorStore};
use spchat_sharepoint::{SharePointClient, SharePointConfig};

type Retrieval = LocalRetrievalEngine<LocalVectorStore, LocalDocumentIndexer<LocalVectorStore>>;
type Engine = ChatEngine<OpenAiClient, Retrieval>;

#[derive(Parser)]
#[command(name = "spchat")]
#[command(about = "Retrieval-augmented chat over a SharePoint document set", long_about = None)]
struct Cli {
    /// Ask a single question using env credentials, print the answer, exit
    #[arg(long)]
    ask: Option<String>,
}

/// Credential form values, seeded from the environment
struct CredentialForm {
    site_url: String,
    site_name: String,
    username: String,
    password: String,
}

impl CredentialForm {
    fn from_env() -> Self {
        Self {
            site_url: env::var("SHAREPOINT_URL").unwrap_or_default(),
            site_name: env::var("SHAREPOINT_SITE_NAME").unwrap_or_default(),
            username: env::var("SHAREPOINT_USERNAME").unwrap_or_default(),
            password: env::var("SHAREPOINT_PASSWORD").unwrap_or_default(),
        }
    }

    /// Interactive form: each field defaults to its previous/env value,
    /// password entry is masked.
    fn prompt(&mut self) -> spchat_core::Result<()> {
        println!("{}", "SharePoint credentials".bold());
        self.site_url = prompt_credential("SharePoint URL", &self.site_url)?;
        self.site_name = prompt_credential("Site name", &self.site_name)?;
        self.username = prompt_credential("Username", &self.username)?;

        let entered = prompt_secret("Password", !self.password.is_empty())?;
        if !entered.is_empty() {
            self.password = entered;
        }
        Ok(())
    }
}

/// Run one fetch+index cycle and return a ready chat engine
///
/// All-or-nothing: any failure leaves the session disconnected and the
/// caller keeps whatever engine it had before.
async fn connect(form: &CredentialForm, session: &mut Session) -> spchat_core::Result<Engine> {
    session.begin_connect();

    let config = SharePointConfig::new(
        form.site_url.clone(),
        form.site_name.clone(),
        form.username.clone(),
        form.password.clone(),
    )?;

    let mut connector = SharePointClient::new(config)?;
    print_status("Connecting to SharePoint...");
    connector.connect().await?;

    print_status("Fetching documents from SharePoint...");
    let documents = connector.fetch_documents().await?;

    print_status("Indexing documents...");
    let mut vector_store = LocalVectorStore::new();
    vector_store.connect().await?;
    let vector_store = Arc::new(vector_store);
    let indexer = Arc::new(LocalDocumentIndexer::new(vector_store.clone()));
    let mut retrieval = LocalRetrievalEngine::new(vector_store, indexer);
    retrieval.rebuild(&documents).await?;

    let mut llm = OpenAiClient::from_env()?;
    llm.connect().await?;

    println!(
        "{} Connected and indexed {} documents from site '{}'",
        "✅".green(),
        documents.len(),
        connector.site()
    );

    session.complete_connect(documents);
    Ok(ChatEngine::new(llm, retrieval))
}

/// One chat round trip; appends two messages on success, zero on failure
async fn ask(engine: &Engine, session: &mut Session, query: &str) {
    print_status("Thinking...");
    match engine.answer(query, session.messages()).await {
        Ok(answer) => {
            session.record_turn(query, &answer);
            // Echo the full turn just appended: question, then answer.
            let from = session.messages().len().saturating_sub(2);
            for message in &session.messages()[from..] {
                print_message(message);
            }
        }
        Err(e) => print_error(&e),
    }
}

async fn run_one_shot(question: &str) -> Result<()> {
    let mut session = Session::new();
    let form = CredentialForm::from_env();

    let engine = connect(&form, &mut session).await.inspect_err(|_| {
        session.fail_connect();
    })?;

    let answer = engine.answer(question, session.messages()).await?;
    session.record_turn(question, &answer);

    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!("Sources:");
        for source in &answer.sources {
            println!("- {}", source);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(question) = cli.ask {
        return run_one_shot(&question).await;
    }

    display_banner();

    // The one process-wide mutable context; torn down on exit.
    let mut session = Session::new();
    let mut engine: Option<Engine> = None;
    let mut form = CredentialForm::from_env();
    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        if input_lower == "docs" {
            print_documents(session.documents());
            continue;
        }

        if input_lower == "connect" {
            if let Err(e) = form.prompt() {
                print_error(&e);
                continue;
            }

            match connect(&form, &mut session).await {
                Ok(ready) => engine = Some(ready),
                Err(e) => {
                    session.fail_connect();
                    print_error(&e);
                }
            }
            continue;
        }

        // Anything else is a question; the chat affordance is gated on
        // connection state, so no engine call happens while disconnected.
        match Engine::for_session(engine.as_ref(), &session) {
            Some(ready) => ask(ready, &mut session, &input).await,
            None => print_error(&Error::InvalidInput(
                "Not connected. Run 'connect' first.".to_string(),
            )),
        }
    }

    Ok(())
}
