//! # Lekha CLI
//!
//! Command-line interface for generating and serving rent invoices.
//!
//! ## Usage
//!
//! ```bash
//! # List catalog templates
//! lekha templates
//!
//! # Render a template straight to files
//! lekha render sagar-trading --pdf invoice.pdf --html invoice.html
//!
//! # Render with a specific date and sequence number
//! lekha render sagar-trading --date 2025-07-21 --seq 3 --pdf invoice.pdf
//!
//! # Start the HTTP server
//! lekha serve --listen 0.0.0.0:8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lekha::{
    catalog,
    config::{Config, SmtpConfig},
    invoice::DocumentDraft,
    mailer::{DisabledMailer, Mailer, SmtpMailer},
    render,
    server,
    signature::SignatureResolver,
    LekhaError, MemoryStore,
};

/// Lekha - rent invoice generator
#[derive(Parser, Debug)]
#[command(name = "lekha")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Directory holding signature.png / signature.jpg
        #[arg(long, default_value = "assets")]
        signature_dir: PathBuf,

        /// HTTP location of the signature image, tried before the directory
        #[arg(long)]
        signature_url: Option<String>,

        /// SMTP relay host (email dispatch stays disabled without it)
        #[arg(long)]
        smtp_host: Option<String>,

        /// SMTP relay port
        #[arg(long, default_value = "587")]
        smtp_port: u16,

        /// SMTP username
        #[arg(long)]
        smtp_username: Option<String>,

        /// SMTP password
        #[arg(long)]
        smtp_password: Option<String>,

        /// From address for outgoing invoices
        #[arg(long)]
        smtp_from: Option<String>,
    },

    /// Render an invoice from a catalog template to files
    Render {
        /// Template id (see `lekha templates`)
        template: String,

        /// Write the PDF here
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Write the standalone HTML document here
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Write the PNG preview here
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Invoice date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Reference sequence number
        #[arg(long, default_value = "1")]
        seq: u64,

        /// Directory holding signature.png / signature.jpg
        #[arg(long, default_value = "assets")]
        signature_dir: PathBuf,
    },

    /// List catalog templates
    Templates,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LekhaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            signature_dir,
            signature_url,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from,
        } => {
            let mut config = Config::default();
            config.listen_addr = listen;
            config.signature_dir = signature_dir;
            config.signature_url = signature_url;
            config.smtp = match (smtp_host, smtp_username, smtp_password, smtp_from) {
                (Some(host), Some(username), Some(password), Some(from_address)) => {
                    Some(SmtpConfig {
                        host,
                        port: smtp_port,
                        username,
                        password,
                        from_address,
                        from_name: config.issuer.name.clone(),
                    })
                }
                _ => None,
            };

            let mailer: Arc<dyn Mailer> = match &config.smtp {
                Some(smtp) => Arc::new(SmtpMailer::new(smtp.clone())?),
                None => {
                    tracing::warn!("SMTP not configured, email dispatch disabled");
                    Arc::new(DisabledMailer)
                }
            };
            let store = Arc::new(MemoryStore::new());

            server::serve(config, store, mailer).await
        }

        Commands::Render {
            template,
            pdf,
            html,
            png,
            date,
            seq,
            signature_dir,
        } => {
            let tpl = catalog::template_by_id(&template).ok_or_else(|| {
                LekhaError::NotFound(format!(
                    "template '{}'. Run `lekha templates` to see available ids.",
                    template
                ))
            })?;

            let invoice_date = date.unwrap_or_else(|| Utc::now().date_naive());
            let doc = DocumentDraft::default().build(&tpl.defaults(), invoice_date, seq);
            let config = Config::default();
            let signature = SignatureResolver::new(signature_dir, None).resolve().await;

            // With no output selected, write the PDF next to the caller.
            let pdf = if pdf.is_none() && html.is_none() && png.is_none() {
                Some(PathBuf::from("invoice.pdf"))
            } else {
                pdf
            };

            println!("Rendering {} ({})...", doc.ref_number, tpl.label);

            if let Some(path) = pdf {
                let bytes = render::pdf::emit(&doc, &config.issuer, &signature)?;
                std::fs::write(&path, bytes)?;
                println!("Saved {}", path.display());
            }
            if let Some(path) = html {
                let page = render::html::render(&doc, &config.issuer, &signature);
                std::fs::write(&path, page)?;
                println!("Saved {}", path.display());
            }
            if let Some(path) = png {
                let bytes = render::canvas::render(&doc, &config.issuer, &signature)?;
                std::fs::write(&path, bytes)?;
                println!("Saved {}", path.display());
            }

            Ok(())
        }

        Commands::Templates => {
            println!("Available templates:");
            for option in catalog::template_options() {
                println!("  {:<20} {}", option.value, option.label);
            }
            Ok(())
        }
    }
}
