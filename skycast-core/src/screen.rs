use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::cache::LastReportCache;
use crate::location::{FixRequest, LocationService, acquire_fix};
use crate::present::{Presenter, WeatherView};
use crate::provider::WeatherProvider;

/// User-visible notices. Everything else (HTTP and transport failures)
/// is logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoInternet,
    LocationProviderDisabled,
    PermissionRationale,
}

/// Output surface of the weather screen.
pub trait ScreenSink {
    fn render(&self, view: &WeatherView);
    fn notice(&self, notice: Notice);
    fn progress_started(&self);
    fn progress_dismissed(&self);
}

impl<T: ScreenSink + ?Sized> ScreenSink for std::sync::Arc<T> {
    fn render(&self, view: &WeatherView) {
        (**self).render(view);
    }

    fn notice(&self, notice: Notice) {
        (**self).notice(notice);
    }

    fn progress_started(&self) {
        (**self).progress_started();
    }

    fn progress_dismissed(&self) {
        (**self).progress_dismissed();
    }
}

/// The single weather screen: cached render on start, then one
/// fix-acquire/fetch/render cycle per refresh.
///
/// Teardown is a cancellation token rather than a nullable render target:
/// once cancelled, in-flight work is abandoned between steps and nothing
/// further reaches the sink.
pub struct WeatherScreen<P, L, S, C> {
    provider: P,
    location: L,
    sink: S,
    connectivity: C,
    cache: LastReportCache,
    presenter: Presenter,
    fix_request: FixRequest,
    cancel: CancellationToken,
}

impl<P, L, S, C> WeatherScreen<P, L, S, C>
where
    P: WeatherProvider,
    L: LocationService,
    S: ScreenSink,
    C: Fn() -> bool,
{
    pub fn new(
        provider: P,
        location: L,
        sink: S,
        connectivity: C,
        cache: LastReportCache,
        presenter: Presenter,
        fix_request: FixRequest,
    ) -> Self {
        Self {
            provider,
            location,
            sink,
            connectivity,
            cache,
            presenter,
            fix_request,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that tears the screen down when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Render the last cached record, if any, so the screen is not empty
    /// while the live fetch is in flight.
    pub fn show_cached(&self) {
        if let Some(record) = self.cache.load() {
            debug!("rendering cached weather record");
            self.sink.render(&self.presenter.render(&record));
        }
    }

    /// Screen start: cached data first, then a live refresh.
    pub async fn start(&self) {
        self.show_cached();
        self.refresh().await;
    }

    /// One full cycle: acquire a fix, check connectivity, fetch, cache,
    /// render. All failures are handled here; none are fatal and none
    /// retry.
    pub async fn refresh(&self) {
        let fix = tokio::select! {
            // Teardown wins over work that happens to be ready.
            biased;
            () = self.cancel.cancelled() => {
                debug!("screen torn down before a fix arrived");
                return;
            }
            fix = acquire_fix(&self.location, &self.sink, &self.fix_request) => fix,
        };

        let coordinate = match fix {
            Ok(coordinate) => coordinate,
            Err(error) => {
                warn!(%error, "location acquisition failed");
                return;
            }
        };

        if !(self.connectivity)() {
            self.sink.notice(Notice::NoInternet);
            return;
        }

        self.sink.progress_started();
        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                self.sink.progress_dismissed();
                debug!("screen torn down mid-fetch");
                return;
            }
            outcome = self.provider.current_weather(coordinate) => outcome,
        };
        self.sink.progress_dismissed();

        match outcome {
            Ok(record) => {
                if let Err(error) = self.cache.save(&record) {
                    warn!(%error, "failed to persist weather record");
                }
                self.sink.render(&self.presenter.render(&record));
            }
            // Logged only; the screen shows no notice for these.
            Err(error) => error!(%error, "weather fetch failed"),
        }
    }
}
