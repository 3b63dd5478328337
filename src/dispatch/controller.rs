use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::api::{ApiRequest, Backend};
use crate::dispatch::{ActionKind, ControlHandle, Navigator, Notifier, Outcome};

/// Drives one kind of action for one control.
///
/// Triggers mark the control busy before returning, so the caller observes
/// the disabled state even if the returned future is spawned and polled
/// later. The future resolves to `None` when nothing was dispatched.
#[derive(Clone)]
pub struct ActionController {
    kind: ActionKind,
    control: ControlHandle,
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    navigator: Arc<dyn Navigator>,
}

impl ActionController {
    pub fn new(
        kind: ActionKind,
        control: ControlHandle,
        backend: Arc<dyn Backend>,
        notifier: Notifier,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            kind,
            control,
            backend,
            notifier,
            navigator,
        }
    }

    pub fn control(&self) -> &ControlHandle {
        &self.control
    }

    /// Trigger a poll or briefing generation.
    pub fn trigger(&self) -> BoxFuture<'static, Option<Outcome>> {
        let request = match self.kind {
            ActionKind::Poll => ApiRequest::poll_now(),
            ActionKind::GenerateBriefing => ApiRequest::generate_briefing(),
            ActionKind::Reclassify => {
                warn!(control = self.control.id(), "reclassify needs an item and category");
                return future::ready(None).boxed();
            }
        };
        self.run(request)
    }

    /// Apply `category` to `item_id`. Without a category nothing happens.
    pub fn reclassify(
        &self,
        item_id: &str,
        category: Option<&str>,
    ) -> BoxFuture<'static, Option<Outcome>> {
        if self.kind != ActionKind::Reclassify {
            warn!(
                action = self.kind.name(),
                control = self.control.id(),
                "reclassify sent to the wrong controller"
            );
            return future::ready(None).boxed();
        }
        match category.filter(|c| !c.is_empty()) {
            Some(category) => self.run(ApiRequest::reclassify(item_id, category)),
            None => future::ready(None).boxed(),
        }
    }

    fn run(&self, request: ApiRequest) -> BoxFuture<'static, Option<Outcome>> {
        let kind = self.kind;
        let Some(guard) = self.control.acquire(kind.busy_label(), kind.idle_label()) else {
            debug!(
                action = kind.name(),
                control = self.control.id(),
                "control busy, trigger ignored"
            );
            return future::ready(None).boxed();
        };

        let backend = Arc::clone(&self.backend);
        let notifier = self.notifier.clone();
        let navigator = Arc::clone(&self.navigator);

        async move {
            // Held until the end of this block; dropping it restores the
            // control on every path, unwinding included.
            let _guard = guard;

            info!(action = kind.name(), path = %request.path(), "dispatching");
            let response = backend.send(&request).await;
            match &response {
                Ok(response) => debug!(action = kind.name(), status = response.status, "answered"),
                Err(e) => warn!(action = kind.name(), error = %e, "request failed"),
            }

            let outcome = kind.interpret(response);
            let notification = outcome.notification(kind);
            notifier.show(notification.text, notification.severity);

            if let Some(location) = outcome.redirect() {
                if let Err(e) = navigator.navigate(location) {
                    warn!(action = kind.name(), %location, error = %e, "navigation failed");
                }
            }

            info!(action = kind.name(), success = outcome.is_success(), "finished");
            Some(outcome)
        }
        .boxed()
    }
}
