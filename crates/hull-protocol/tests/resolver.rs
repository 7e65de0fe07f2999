//! Integration tests for scheme resolution against a packaged asset tree.

use hull_protocol::{
    FallbackReason, LocaleTable, ResolverOptions, ResponseDescriptor, SchemeResolver,
};
use proptest::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

const SCHEME: &str = "k8s-website-v1-24";

fn packaged_app() -> (TempDir, SchemeResolver) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("app");
    fs::create_dir_all(root.join("dist/zh-cn")).unwrap();
    fs::create_dir_all(root.join("dist/docs")).unwrap();
    fs::write(root.join("dist/index.html"), "<html>fallback</html>").unwrap();
    fs::write(root.join("dist/zh-cn/index.html"), "<html>zh</html>").unwrap();
    fs::write(root.join("dist/docs/index.html"), "<html>docs</html>").unwrap();
    fs::write(root.join("zh-cn.html"), "<html>root level</html>").unwrap();
    // Sibling of the asset root that must never be reachable.
    fs::write(temp.path().join("secret.txt"), "top secret").unwrap();

    let resolver = SchemeResolver::new(ResolverOptions {
        scheme: SCHEME.to_string(),
        asset_root: root,
        locales: LocaleTable::builtin(),
    })
    .unwrap();
    (temp, resolver)
}

fn url(path: &str) -> String {
    format!("{SCHEME}://{path}")
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_traversal_request_serves_fallback() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (_temp, resolver) = packaged_app();
    let resolution = resolver
        .resolve_detailed(&resolver.request(url("../../etc/passwd")), "en-US")
        .await;

    assert_eq!(resolution.candidate, "etc/passwd");
    assert!(!resolution.resolved.exists);
    assert!(resolution.resolved.normalized_path.starts_with(resolver.asset_root()));
    assert!(matches!(
        resolution.response,
        ResponseDescriptor::Fallback {
            reason: FallbackReason::NotFound,
            ..
        }
    ));
    assert_eq!(resolution.response.path(), Some(resolver.fallback_path()));

    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("etc/passwd"), "{output}");
    assert!(output.contains("candidate="), "{output}");
    assert!(output.contains("fallback_path="), "{output}");
}

#[tokio::test]
async fn test_query_string_is_discarded() {
    let (_temp, resolver) = packaged_app();
    let resolution = resolver
        .resolve_detailed(&resolver.request(url("zh-cn.html?x=1")), "zh-CN")
        .await;

    assert!(resolution.resolved.exists);
    assert!(!resolution.resolved.requested_path.contains('?'));
    assert_eq!(
        resolution.response.path().unwrap(),
        resolver.asset_root().join("zh-cn.html")
    );
    assert_eq!(resolution.response.read().await.unwrap(), b"<html>root level</html>");
}

#[tokio::test]
async fn test_locale_directory_with_query() {
    let (_temp, resolver) = packaged_app();
    let response = resolver.resolve_url(&url("dist/zh-cn/index.html?x=1"), "en-US").await;

    assert!(!response.is_fallback());
    assert_eq!(response.read().await.unwrap(), b"<html>zh</html>");
}

#[tokio::test]
async fn test_sibling_files_unreachable() {
    let (_temp, resolver) = packaged_app();
    for path in [
        "../secret.txt",
        "..\\secret.txt",
        "dist/../../secret.txt",
        "dist\\..\\..\\secret.txt",
        "./../secret.txt",
        "/../secret.txt",
    ] {
        let response = resolver.resolve_url(&url(path), "en-US").await;
        assert!(response.is_fallback(), "{path} was served directly");
        assert_ne!(response.read().await.unwrap(), b"top secret");
    }
}

#[tokio::test]
async fn test_directory_style_requests() {
    let (_temp, resolver) = packaged_app();

    let response = resolver.resolve_url(&url("dist/docs/"), "en-US").await;
    assert_eq!(
        response.path().unwrap(),
        resolver.asset_root().join("dist/docs/index.html")
    );

    let response = resolver.resolve_url(&url("dist\\docs\\"), "en-US").await;
    assert_eq!(
        response.path().unwrap(),
        resolver.asset_root().join("dist/docs/index.html")
    );
}

#[tokio::test]
async fn test_spa_routes_fall_back() {
    let (_temp, resolver) = packaged_app();
    for path in ["settings", "dist/docs/getting-started/", "assets/missing.js"] {
        let response = resolver.resolve_url(&url(path), "zh-CN").await;
        assert_eq!(response.status(), 200);
        assert!(response.is_fallback(), "{path:?}");
        assert_eq!(response.read().await.unwrap(), b"<html>fallback</html>");
    }
}

#[tokio::test]
async fn test_no_path_request_follows_ui_locale() {
    let (_temp, resolver) = packaged_app();

    let response = resolver.resolve_url(&url(""), "zh-CN").await;
    assert!(!response.is_fallback());
    assert_eq!(response.read().await.unwrap(), b"<html>zh</html>");

    for locale in ["en-US", "tlh", ""] {
        let response = resolver.resolve_url(&url("?x=1"), locale).await;
        assert_eq!(response.read().await.unwrap(), b"<html>fallback</html>", "{locale:?}");
    }
}

#[tokio::test]
async fn test_concurrent_resolution() {
    let (_temp, resolver) = packaged_app();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..32 {
        let resolver = resolver.clone();
        tasks.spawn(async move {
            let path = if i % 2 == 0 { "dist/zh-cn/" } else { "missing" };
            (i, resolver.resolve_url(&url(path), "en-US").await)
        });
    }

    while let Some(result) = tasks.join_next().await {
        let (i, response) = result.unwrap();
        assert_eq!(response.is_fallback(), i % 2 == 1);
    }
}

fn traversal_prefix() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![Just("../"), Just("..\\"), Just(".."), Just("./"), Just("//")],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_normalized_path_stays_in_root(
        prefix in traversal_prefix(),
        tail in "[a-z./\\\\]{0,24}",
        query in "(\\?[a-z=&]{0,8})?",
        locale in prop_oneof![Just("en-US".to_string()), Just("zh-CN".to_string()), "[a-z-]{0,6}"],
    ) {
        let (_temp, resolver) = packaged_app();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let raw = url(&format!("{prefix}{tail}{query}"));

        let resolution = runtime.block_on(resolver.resolve_detailed(&resolver.request(raw.clone()), &locale));

        prop_assert!(resolution.resolved.normalized_path.starts_with(resolver.asset_root()));
        let served = resolution.response.path().unwrap();
        prop_assert!(served.starts_with(resolver.asset_root()), "{raw} served {}", served.display());
        prop_assert!(!resolution.candidate.starts_with("../"));
        prop_assert!(!resolution.candidate.starts_with("..\\"));
        prop_assert!(!resolution.resolved.requested_path.contains('?'));
    }

    #[test]
    fn prop_unknown_locales_select_default(tag in "[a-zA-Z-]{0,12}") {
        let table = LocaleTable::builtin();
        let entry = table.entry_for(&tag);
        if table.contains(&tag) {
            prop_assert_ne!(entry, "");
        } else {
            prop_assert_eq!(entry, table.default_entry());
        }
        prop_assert_eq!(entry, table.entry_for(&tag));
    }
}

#[test]
fn test_fallback_lives_under_root() {
    let (_temp, resolver) = packaged_app();
    assert!(resolver.fallback_path().starts_with(resolver.asset_root()));
    assert!(Path::new(resolver.fallback_path()).ends_with("dist/index.html"));
}
