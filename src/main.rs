//! Draft Desk headless driver.
//!
//! Opens one editor session against the configured document store, prints
//! its plain-text export and optionally copies it to the system clipboard.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use draft_desk::adapters::rest::{HttpReviserConfig, HttpStoreConfig};
use draft_desk::adapters::{
    FileTemplateCache, HttpDocumentStore, HttpTextReviser, InMemoryTemplateCache, SystemClipboard,
    TracingNotifier,
};
use draft_desk::application::{
    open_session, ClipboardExporter, EditorSession, ModeResolver, NavigationContext, Resolution,
    SessionSettings, TemplateLibrary,
};
use draft_desk::config::{init_tracing, AppConfig};
use draft_desk::domain::foundation::DocumentId;
use draft_desk::i18n::Locale;
use draft_desk::ports::{Notifier, TemplateCache};

/// Driver command line arguments.
#[derive(Parser, Debug)]
#[command(name = "draft-desk")]
#[command(about = "Open a draft or template and print its plain text")]
struct Args {
    /// Draft id to open
    #[arg(short, long, value_name = "ID", conflicts_with = "template")]
    draft: Option<String>,

    /// Index into the template list
    #[arg(short, long, value_name = "INDEX")]
    template: Option<usize>,

    /// Copy the document to the system clipboard
    #[arg(short, long)]
    copy: bool,

    /// UI language (overrides `editor.locale`)
    #[arg(short, long, value_name = "CODE")]
    locale: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let locale = match args.locale.as_deref() {
        Some(code) => Locale::parse(code).ok_or_else(|| format!("Unsupported locale: {}", code))?,
        None => config.editor.locale(),
    };

    info!(store = %config.store.endpoint(), %locale, "Starting draft-desk");

    let store = Arc::new(HttpDocumentStore::new(HttpStoreConfig::from_config(
        &config.store,
    ))?);
    let reviser = Arc::new(HttpTextReviser::new(HttpReviserConfig::from_config(&config))?);
    let cache: Arc<dyn TemplateCache> = match &config.cache.path {
        Some(path) => Arc::new(FileTemplateCache::new(path)),
        None => Arc::new(InMemoryTemplateCache::new()),
    };
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let notice_duration = config.editor.notice_duration();

    let context = match (args.draft, args.template) {
        (Some(id), _) => NavigationContext::draft(DocumentId::parse(id)?),
        (None, Some(index)) => {
            // An in-memory cache starts empty; fill it before resolving.
            if !config.cache.is_persistent() {
                TemplateLibrary::new(store.clone(), cache.clone(), notifier.clone(), notice_duration)
                    .with_locale(locale)
                    .refresh()
                    .await?;
            }
            NavigationContext::template_index(index)
        }
        (None, None) => return Err("Pass --draft <ID> or --template <INDEX>".into()),
    };

    let mut settings = SessionSettings::from_config(&config.editor);
    settings.locale = locale;
    let session = EditorSession::new(store, reviser, notifier.clone(), settings)
        .with_template_cache(cache.clone());
    let resolver = ModeResolver::new(cache);

    if let Resolution::Redirect(target) = open_session(&resolver, &session, &context).await? {
        return Err(format!("Nothing to open, redirected to {:?}", target).into());
    }

    if let Some(label) = session.label().await {
        println!("# {}", label);
    }
    if let Some(text) = session.view(|editor| editor.get_plain_text()).await {
        println!("{}", text);
    }

    if args.copy {
        if let Some(document) = session.snapshot().await {
            ClipboardExporter::new(Arc::new(SystemClipboard::new()), notifier, notice_duration)
                .with_locale(locale)
                .copy(&document)
                .await?;
        }
    }

    session.close().await;
    Ok(())
}
