//! # JSON:API Sample
//!
//! Binds an `authors` resource over HTTP and prints the deserialized model.
//!
//! ```bash
//! jsonapi-sample https://api.example.com /authors/17
//! jsonapi-sample https://api.example.com /authors/17 --rename "Ada Lovelace"
//! ```
//!
//! The flow:
//! 1. Build the [`BindingSystem`] and open one binding; the path is fetched on start.
//! 2. Read the [`Author`](jsonapi_sample::model::Author) through [`AuthorClient`].
//! 3. Optionally rename it, which PATCHes the re-serialized model.

use clap::Parser;
use jsonapi_binding::{BindingConfig, DEFAULT_WRAPPER_KEY};
use jsonapi_sample::clients::AuthorClient;
use jsonapi_sample::error::AuthorError;
use jsonapi_sample::lifecycle::{next_response, setup_tracing, BindingSystem};
use tracing::{info, info_span, Instrument};

/// Fetch (and optionally rename) a JSON:API author
#[derive(Parser, Debug)]
#[command(name = "jsonapi-sample", version, about)]
struct Args {
    /// Server base URL, e.g. https://api.example.com
    base_url: String,

    /// Resource path appended to the base URL, e.g. /authors/17
    resource: String,

    /// New name to PATCH after loading
    #[arg(long)]
    rename: Option<String>,

    /// Wrapper key passed to the formatter
    #[arg(long, default_value = DEFAULT_WRAPPER_KEY)]
    wrapper_key: String,
}

#[tokio::main]
async fn main() -> Result<(), AuthorError> {
    let args = Args::parse();
    setup_tracing();

    info!(base_url = %args.base_url, resource = %args.resource, "Starting");

    let mut system = BindingSystem::new()?;
    let handle = system.open(
        BindingConfig::new(&args.base_url, &args.resource).with_wrapper_key(&args.wrapper_key),
    )?;
    let authors = AuthorClient::new(handle.client().clone());

    let ok = next_response(handle.events())
        .instrument(info_span!("initial_fetch"))
        .await?;
    if !ok {
        authors.check().await?;
        return Err(AuthorError::NotLoaded);
    }
    let author = authors.author().await?;
    println!("{}", serde_json::to_string_pretty(&author).unwrap_or_default());

    if let Some(name) = args.rename {
        let span = info_span!("rename", name = %name);
        async {
            authors.rename(&name).await?;
            next_response(handle.events()).await?;
            authors.check().await
        }
        .instrument(span)
        .await?;

        let author = authors.author().await?;
        println!("{}", serde_json::to_string_pretty(&author).unwrap_or_default());
    }

    drop(authors);
    system.shutdown().await?;
    info!("Done");
    Ok(())
}
