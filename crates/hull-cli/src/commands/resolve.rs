//! Resolve command implementation.
//!
//! Shows how a URL on the private scheme maps onto the asset root: the
//! sanitized candidate, the joined and normalized paths, and what is finally
//! served. Remote URLs are checked against the persisted `enableHttp` flag.

use crate::cli::ResolveArgs;
use crate::commands::{build_resolver, load_config};
use crate::error::Result;
use hull_config::{SettingsStore, ENABLE_HTTP};
use hull_protocol::{RemoteGuard, ResponseDescriptor};
use serde_json::json;
use std::path::Path;

/// Execute the resolve command.
///
/// # Errors
///
/// Returns errors for invalid configuration or an unreadable settings file.
pub async fn execute(args: ResolveArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, Vec::new())?;
    let resolver = build_resolver(&config)?;

    if is_remote(&args.url) {
        let store = SettingsStore::open(config.resolved_settings_path())?;
        let guard = RemoteGuard::new(store.get_bool(ENABLE_HTTP) == Some(true));
        let blocked = guard.check(&args.url);
        print_remote(&args, blocked.as_ref());
        return Ok(());
    }

    let locale = args
        .locale
        .as_deref()
        .unwrap_or_else(|| resolver.locales().default_tag());
    let resolution = resolver
        .resolve_detailed(&resolver.request(args.url.clone()), locale)
        .await;
    let response = &resolution.response;
    let entry = args
        .locale
        .as_deref()
        .map(|locale| resolver.entry_url(locale));

    if args.json {
        let value = json!({
            "url": resolution.url,
            "candidate": resolution.candidate,
            "requested_path": resolution.resolved.requested_path,
            "normalized_path": resolution.resolved.normalized_path,
            "exists": resolution.resolved.exists,
            "status": response.status(),
            "served": response.path(),
            "content_type": response.content_type(),
            "fallback": response.is_fallback(),
            "entry": entry,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("url:             {}", resolution.url);
    println!("candidate:       {}", resolution.candidate);
    println!("requested path:  {}", resolution.resolved.requested_path);
    println!("normalized path: {}", resolution.resolved.normalized_path.display());
    println!("exists:          {}", resolution.resolved.exists);
    println!("status:          {}", response.status());
    println!(
        "served:          {}{}",
        response.file_url(),
        if response.is_fallback() { " (fallback)" } else { "" }
    );
    println!("content type:    {}", response.content_type());
    if let Some(entry) = entry {
        println!("entry:           {}", entry);
    }

    Ok(())
}

fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn print_remote(args: &ResolveArgs, blocked: Option<&ResponseDescriptor>) {
    let status = blocked.map_or(200, ResponseDescriptor::status);
    if args.json {
        println!(
            "{}",
            json!({ "url": args.url, "status": status, "remote": true, "allowed": blocked.is_none() })
        );
    } else {
        println!("url:    {}", args.url);
        println!("status: {}", status);
        println!(
            "remote: {}",
            if blocked.is_some() { "blocked (enableHttp is off)" } else { "allowed" }
        );
    }
}
