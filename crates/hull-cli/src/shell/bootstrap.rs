use super::{start_target, HostRuntime, StartTarget, WindowId, WindowOptions};
use hull_config::FeatureFlags;
use hull_protocol::{RemoteGuard, SchemeResolver};
use tracing::{debug, error, info};

/// Lifecycle notifications from the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Runtime initialised; fires once.
    Ready,
    /// Application re-activated (dock click); any number of times after ready.
    Activate,
    AllWindowsClosed,
}

/// Ordered startup of the shell against a [`HostRuntime`].
pub struct Bootstrap<R: HostRuntime> {
    runtime: R,
    resolver: SchemeResolver,
    flags: FeatureFlags,
    dev_server_url: Option<String>,
    guard: Option<RemoteGuard>,
    quit_on_last_window: bool,
}

impl<R: HostRuntime> Bootstrap<R> {
    pub fn new(
        runtime: R,
        resolver: SchemeResolver,
        flags: FeatureFlags,
        dev_server_url: Option<String>,
    ) -> Self {
        Self {
            runtime,
            resolver,
            flags,
            dev_server_url,
            guard: None,
            // macOS apps stay alive without windows until quit explicitly.
            quit_on_last_window: !cfg!(target_os = "macos"),
        }
    }

    pub fn with_quit_on_last_window(mut self, quit: bool) -> Self {
        self.quit_on_last_window = quit;
        self
    }

    pub fn handle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Ready => self.on_ready(),
            LifecycleEvent::Activate => {
                if !self.is_ready() {
                    debug!(target: "main", "activate before ready ignored");
                    return;
                }
                if self.runtime.window_count() == 0 {
                    self.open_window();
                }
            }
            LifecycleEvent::AllWindowsClosed => {
                if self.quit_on_last_window {
                    info!(target: "main", "all windows closed, quitting");
                    self.runtime.quit();
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.guard.is_some()
    }

    /// Guard for remote loads; `None` until ready.
    pub fn remote_guard(&self) -> Option<&RemoteGuard> {
        self.guard.as_ref()
    }

    pub fn start_target(&self) -> StartTarget {
        start_target(
            self.dev_server_url.as_deref(),
            &self.resolver,
            &self.runtime.locale(),
        )
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    fn on_ready(&mut self) {
        if self.is_ready() {
            debug!(target: "main", "duplicate ready ignored");
            return;
        }

        let mut guard = RemoteGuard::new(self.flags.enable_http);
        if let Some(url) = self.dev_server_url.as_deref() {
            guard = guard.allow_origin(url);
        }
        if !guard.allows_remote() {
            info!(target: "disable_http", "remote http and https loads disabled");
        }
        self.guard = Some(guard);

        info!(
            target: "main",
            scheme = self.resolver.scheme(),
            asset_root = %self.resolver.asset_root().display(),
            dev_tools = self.flags.dev_tools,
            "shell ready"
        );
        self.open_window();
    }

    fn open_window(&mut self) -> WindowId {
        let options = WindowOptions {
            dev_tools: self.flags.dev_tools,
            ..WindowOptions::default()
        };
        let window = self.runtime.create_window(&options);
        let target = self.start_target();

        if let Err(err) = self.runtime.load_url(window, target.url()) {
            error!(target: "main", url = target.url(), error = %err, "failed to load start url");
        }
        window
    }
}
