use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use lawdesk_client::{
    build_knowledge, default_urls, write_knowledge, ChatController, ControllerConfig,
    RelayClient, SendOutcome, TerminalView,
};
use lawdesk_core::{FileStore, KeyValueStore, MemoryStore};
use lawdesk_intake::{
    ConsultationType, ContactInfo, IntakeWizard, SchedulingPreference, WebhookSubmitter,
    WizardError, WizardStep, OTHER_REFERRAL, SERVICE_CATALOGUE,
};

#[derive(Parser)]
#[command(name = "lawdesk-chat")]
#[command(about = "Terminal client for the lawdesk chat relay")]
#[command(version)]
struct Cli {
    #[arg(long, env = "LAWDESK_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    /// Directory for the knowledge cache and the saved intake form
    #[arg(long, env = "LAWDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Send a single message
    Send {
        /// Message content
        message: String,
    },
    /// Walk through the client intake form
    Intake {
        /// Webhook receiving the completed form
        #[arg(long, env = "INTAKE_WEBHOOK_URL")]
        webhook_url: String,

        /// Form service receiving the contact step (e.g. a Formspree endpoint)
        #[arg(long, env = "INTAKE_CONTACT_ENDPOINT")]
        contact_endpoint: Option<String>,

        /// Price of the full paid consultation, in dollars
        #[arg(long, default_value_t = 250)]
        paid_price: u32,
    },
    /// Knowledge document tools
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },
}

#[derive(Subcommand)]
enum KnowledgeCommands {
    /// Crawl site pages into the knowledge JSON served at /data/knowledge.json
    Build {
        #[arg(long, short, default_value = "public/data/knowledge.json")]
        output: PathBuf,

        /// Pages to fetch; defaults to the firm's site
        urls: Vec<String>,
    },
}

const REFERRAL_SOURCES: [(&str, &str); 5] = [
    ("google", "Google Search"),
    ("friend", "Friend or Family"),
    ("social-media", "Social Media"),
    ("previous-client", "Previous Client"),
    (OTHER_REFERRAL, "Other"),
];

const DISCLAIMER: &str = "Submitting this form does not create an attorney-client relationship. \
Information you provide will be reviewed to determine whether the firm can assist you.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("lawdesk")
    });

    if cli.debug {
        eprintln!("{}", "[DEBUG] Debug mode enabled".dimmed());
        eprintln!(
            "{}",
            format!("[DEBUG] Server URL: {}", cli.server_url).dimmed()
        );
        eprintln!(
            "{}",
            format!("[DEBUG] Data dir: {}", data_dir.display()).dimmed()
        );
    }

    let persistent: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));

    match cli.command {
        Commands::Chat => {
            let controller = build_controller(&cli.server_url, persistent, cli.debug).await;
            run_interactive_chat(&controller).await
        }
        Commands::Send { message } => {
            let controller = build_controller(&cli.server_url, persistent, cli.debug).await;
            send_once(&controller, &message).await
        }
        Commands::Intake {
            webhook_url,
            contact_endpoint,
            paid_price,
        } => {
            let mut submitter = WebhookSubmitter::new(reqwest::Client::new(), webhook_url);
            if let Some(endpoint) = contact_endpoint {
                submitter = submitter.with_contact_endpoint(endpoint);
            }
            run_intake(persistent, &submitter, paid_price).await
        }
        Commands::Knowledge {
            command: KnowledgeCommands::Build { output, urls },
        } => {
            let urls = if urls.is_empty() { default_urls() } else { urls };
            println!(
                "{}",
                format!("📚 Building knowledge from {} page(s)", urls.len()).cyan()
            );
            let knowledge = build_knowledge(&reqwest::Client::new(), &urls).await;
            write_knowledge(&knowledge, &output).await?;
            println!(
                "{}",
                format!(
                    "✅ Wrote {} page(s) to {}",
                    knowledge.pages.len(),
                    output.display()
                )
                .green()
            );
            Ok(())
        }
    }
}

async fn build_controller(
    server_url: &str,
    persistent: Arc<dyn KeyValueStore>,
    debug: bool,
) -> ChatController {
    let controller = ChatController::new(
        ControllerConfig::default(),
        RelayClient::new(server_url),
        Arc::new(TerminalView::new(debug)),
        Arc::new(MemoryStore::new()),
        persistent,
    );
    controller.init().await;
    controller
}

async fn send_once(controller: &ChatController, message: &str) -> anyhow::Result<()> {
    controller.open().await;
    match controller.send_message(message).await {
        SendOutcome::Failed(error) => anyhow::bail!("chat request failed: {error}"),
        _ => Ok(()),
    }
}

async fn run_interactive_chat(controller: &ChatController) -> anyhow::Result<()> {
    println!("{}", "⚖️  Lawdesk Chat".cyan().bold());
    println!(
        "{}",
        "Type 'exit' or 'quit' to leave, '/retry' to resend, or a number to pick a suggestion"
            .dimmed()
    );
    println!();

    controller.open().await;
    print_suggestions(controller);

    loop {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("{}", "👋 Goodbye!".cyan());
            break;
        }

        if input.is_empty() {
            continue;
        }

        if input == "/retry" {
            if controller.retry().await == SendOutcome::Ignored {
                println!("{}", "Nothing to retry.".dimmed());
            }
            continue;
        }

        let suggestion = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| controller.config().suggestions.get(i).cloned());

        match suggestion {
            Some(suggestion) => {
                controller.handle_suggestion(&suggestion).await;
            }
            None => {
                controller.send_message(input).await;
            }
        }
        println!();
    }

    controller.close().await;
    Ok(())
}

fn print_suggestions(controller: &ChatController) {
    for (i, suggestion) in controller.config().suggestions.iter().enumerate() {
        println!("  {} {}", format!("[{}]", i + 1).yellow(), suggestion);
    }
    println!();
}

// ===== Intake =====

/// Read one answer. `None` means the user typed `/back`.
fn ask(label: &str) -> anyhow::Result<Option<String>> {
    print!("{} ", format!("{label}:").cyan());
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        anyhow::bail!("input closed");
    }
    let input = input.trim();
    if input == "/back" {
        return Ok(None);
    }
    Ok(Some(input.to_string()))
}

fn ask_yes_no(label: &str, default: bool) -> anyhow::Result<Option<bool>> {
    let hint = if default { "Y/n" } else { "y/N" };
    Ok(ask(&format!("{label} [{hint}]"))?.map(|answer| {
        match answer.to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        }
    }))
}

/// Numbered menu; returns the chosen index.
fn choose(label: &str, options: &[&str]) -> anyhow::Result<Option<usize>> {
    for (i, option) in options.iter().enumerate() {
        println!("  {} {}", format!("[{}]", i + 1).yellow(), option);
    }
    loop {
        let Some(answer) = ask(label)? else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("{}", "Please choose an option.".red()),
        }
    }
}

fn report(error: WizardError) -> anyhow::Result<()> {
    match error {
        WizardError::Validation(errors) => {
            for e in &errors.errors {
                println!("{}", format!("  ✗ {}: {}", e.field, e.message).red());
            }
            Ok(())
        }
        WizardError::Rejected { status, .. } => {
            println!(
                "{}",
                format!(
                    "❌ There was an error submitting your form (HTTP {status}). Please try again."
                )
                .red()
            );
            Ok(())
        }
        WizardError::Http(e) => {
            println!(
                "{}",
                format!("❌ There was an error submitting your form: {e}").red()
            );
            Ok(())
        }
        other => Err(other.into()),
    }
}

async fn run_intake(
    store: Arc<dyn KeyValueStore>,
    submitter: &WebhookSubmitter,
    paid_price: u32,
) -> anyhow::Result<()> {
    let mut wizard = IntakeWizard::restore(store).await;

    println!("{}", "📝 Client Intake".cyan().bold());
    println!(
        "{}",
        "Type '/back' at any prompt to return to the previous step".dimmed()
    );

    loop {
        let step = wizard.step();
        println!();
        println!(
            "{} {}",
            format!("Step {}", step).bold(),
            format!("({}%)", wizard.progress_percent()).dimmed()
        );

        let advanced = match step {
            WizardStep::ContactInfo => {
                let saved = wizard.form().contact_info.clone();
                let mut contact = ContactInfo::default();
                let fields = [
                    ("Full name", &saved.full_name, &mut contact.full_name),
                    ("Email", &saved.email, &mut contact.email),
                    ("Phone", &saved.phone, &mut contact.phone),
                    ("Location", &saved.location, &mut contact.location),
                ];
                for (label, previous, value) in fields {
                    let prompt = if previous.is_empty() {
                        label.to_string()
                    } else {
                        format!("{label} ({previous})")
                    };
                    let answer = ask(&prompt)?.unwrap_or_default();
                    *value = if answer.is_empty() {
                        previous.clone()
                    } else {
                        answer
                    };
                }
                wizard.set_contact(contact).await?;
                wizard.submit_contact(submitter).await.map(|_| ())
            }
            WizardStep::ReferralSource => {
                let labels: Vec<&str> = REFERRAL_SOURCES.iter().map(|(_, l)| *l).collect();
                match choose("How did you hear about us?", &labels)? {
                    None => wizard.prev().await.map(|_| ()),
                    Some(i) => {
                        let source = REFERRAL_SOURCES[i].0;
                        let details = if source == OTHER_REFERRAL {
                            ask("Please specify")?
                        } else {
                            None
                        };
                        wizard.select_referral(source, details.as_deref()).await?;
                        wizard.next().await.map(|_| ())
                    }
                }
            }
            WizardStep::ServiceType => match choose("Service", &SERVICE_CATALOGUE)? {
                None => wizard.prev().await.map(|_| ()),
                Some(i) => {
                    wizard.select_service(SERVICE_CATALOGUE[i]).await?;
                    wizard.next().await.map(|_| ())
                }
            },
            WizardStep::CaseDetails => match ask("Describe your case")? {
                None => wizard.prev().await.map(|_| ()),
                Some(details) => {
                    wizard.set_case_details(&details).await?;
                    wizard.next().await.map(|_| ())
                }
            },
            WizardStep::ConsultationType => {
                let paid_label = format!(
                    "{} (${paid_price})",
                    ConsultationType::Paid.description()
                );
                let free_label = format!("{} (Free)", ConsultationType::Free.description());
                match choose("Consultation", &[free_label.as_str(), paid_label.as_str()])? {
                    None => wizard.prev().await.map(|_| ()),
                    Some(i) => {
                        let kind = if i == 0 {
                            ConsultationType::Free
                        } else {
                            ConsultationType::Paid
                        };
                        wizard.select_consultation(kind, paid_price).await?;
                        wizard.next().await.map(|_| ())
                    }
                }
            }
            WizardStep::AddOns => {
                let addons = wizard.form().addons.clone();
                match ask_yes_no("Document review (+$150)?", addons.document_review)? {
                    None => wizard.prev().await.map(|_| ()),
                    Some(review) => {
                        let transcript = ask_yes_no(
                            "Consultation transcript (free)?",
                            addons.consultation_transcript,
                        )?
                        .unwrap_or(addons.consultation_transcript);
                        wizard.set_document_review(review).await?;
                        wizard.set_transcript(transcript).await?;
                        println!(
                            "{}",
                            format!("Total: ${}", wizard.form().total_amount).dimmed()
                        );
                        wizard.next().await.map(|_| ())
                    }
                }
            }
            WizardStep::Scheduling => match ask("Preferred date/time (YYYY-MM-DDTHH:MM)")? {
                None => wizard.prev().await.map(|_| ()),
                Some(preferred) => {
                    let alternative = ask("Alternative date/time (optional)")?.unwrap_or_default();
                    let zoom = ask_yes_no("Meet over Zoom?", false)?.unwrap_or(false);
                    let notes = ask("Additional notes (optional)")?.unwrap_or_default();
                    wizard
                        .set_scheduling(SchedulingPreference {
                            preferred_date_time: preferred,
                            alternative_date_time: alternative,
                            zoom_preference: zoom,
                            additional_notes: notes,
                        })
                        .await?;
                    wizard.next().await.map(|_| ())
                }
            },
            WizardStep::Disclaimer => {
                println!("{}", wizard.form().summary());
                println!();
                println!("{}", DISCLAIMER.dimmed());
                match ask_yes_no("I accept the disclaimer", false)? {
                    None => wizard.prev().await.map(|_| ()),
                    Some(accepted) => {
                        wizard.set_disclaimer(accepted).await?;
                        match wizard.submit(submitter).await {
                            Ok(outcome) => {
                                println!("{}", "✅ Thank you! Your intake has been submitted.".green());
                                println!("{}", outcome.summary);
                                println!();
                                println!("{}", outcome.next_steps.message.cyan());
                                for item in &outcome.next_steps.items {
                                    println!("  • {}", item);
                                }
                                Ok(())
                            }
                            Err(e) => Err(e),
                        }
                    }
                }
            }
            WizardStep::Success => break,
        };

        if let Err(e) = advanced {
            report(e)?;
        }
    }

    Ok(())
}
