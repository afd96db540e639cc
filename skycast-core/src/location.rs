use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::LocationError;
use crate::model::Coordinate;
use crate::screen::{Notice, ScreenSink};

/// Location permissions, requested together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    FineLocation,
    CoarseLocation,
}

/// Outcome of a permission request. Granting either permission counts as
/// granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Parameters for a one-shot fix request.
#[derive(Debug, Clone)]
pub struct FixRequest {
    pub high_accuracy: bool,
    /// Accept a fix even when precision is not yet optimal, so the wait
    /// cannot stall on a slow provider.
    pub accept_imprecise: bool,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for FixRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            accept_imprecise: true,
            timeout: None,
        }
    }
}

/// A platform location facility, consumed by the acquisition flow.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Whether at least one location provider is enabled.
    fn is_enabled(&self) -> bool;

    /// Ask for the given permissions; a single grant is sufficient.
    async fn request_permissions(&self, permissions: &[Permission]) -> PermissionDecision;

    /// Deliver exactly one fix for this request.
    async fn request_fix(&self, request: &FixRequest) -> Result<Coordinate, LocationError>;
}

/// States of the acquisition flow.
#[derive(Debug)]
enum AcquisitionState {
    Idle,
    PermissionRequested,
    PermissionGranted,
    PermissionDenied,
    AwaitingFix,
    FixObtained(Coordinate),
    Failed(LocationError),
}

/// Drives one acquisition cycle: provider probe, permission request, then
/// a single fix.
///
/// A disabled provider emits a notice and a settings redirect but does not
/// stop the flow; a denied permission emits the rationale notice and ends
/// the cycle. The fix callback fires at most once per call.
pub async fn acquire_fix<L, S>(
    service: &L,
    sink: &S,
    request: &FixRequest,
) -> Result<Coordinate, LocationError>
where
    L: LocationService + ?Sized,
    S: ScreenSink + ?Sized,
{
    let mut state = AcquisitionState::Idle;

    loop {
        debug!(state = ?state, "location acquisition");
        state = match state {
            AcquisitionState::Idle => {
                if !service.is_enabled() {
                    // Best-effort: point the user at settings and keep going.
                    sink.notice(Notice::LocationProviderDisabled);
                }
                AcquisitionState::PermissionRequested
            }
            AcquisitionState::PermissionRequested => {
                let decision = service
                    .request_permissions(&[Permission::FineLocation, Permission::CoarseLocation])
                    .await;
                match decision {
                    PermissionDecision::Granted => AcquisitionState::PermissionGranted,
                    PermissionDecision::Denied => AcquisitionState::PermissionDenied,
                }
            }
            AcquisitionState::PermissionGranted => AcquisitionState::AwaitingFix,
            AcquisitionState::PermissionDenied => {
                sink.notice(Notice::PermissionRationale);
                return Err(LocationError::PermissionDenied);
            }
            AcquisitionState::AwaitingFix => match service.request_fix(request).await {
                Ok(coordinate) => AcquisitionState::FixObtained(coordinate),
                Err(error) => AcquisitionState::Failed(error),
            },
            AcquisitionState::FixObtained(coordinate) => return Ok(coordinate),
            AcquisitionState::Failed(error) => return Err(error),
        };
    }
}

/// Network-based fix source: asks a geolocation endpoint where this host is.
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    status: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

impl IpLocator {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LocationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|error| LocationError::Unavailable(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// One lookup, one coordinate.
    pub async fn locate(&self) -> Result<Coordinate, LocationError> {
        let response = self.http.get(&self.endpoint).send().await.map_err(|error| {
            if error.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable(error.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!(
                "geolocation endpoint returned {status}"
            )));
        }

        let parsed: GeolocationResponse = response
            .json()
            .await
            .map_err(|error| LocationError::Unavailable(error.to_string()))?;

        if parsed.status != "success" {
            return Err(LocationError::Unavailable(format!(
                "geolocation lookup failed with status '{}'",
                parsed.status
            )));
        }

        Ok(Coordinate {
            latitude: parsed.lat,
            longitude: parsed.lon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct ScriptedService {
        enabled: bool,
        decision: PermissionDecision,
        fix: Result<Coordinate, ()>,
        permission_calls: AtomicUsize,
        fix_calls: AtomicUsize,
    }

    impl ScriptedService {
        fn new(enabled: bool, decision: PermissionDecision, fix: Result<Coordinate, ()>) -> Self {
            Self {
                enabled,
                decision,
                fix,
                permission_calls: AtomicUsize::new(0),
                fix_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LocationService for ScriptedService {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn request_permissions(&self, permissions: &[Permission]) -> PermissionDecision {
            assert_eq!(
                permissions,
                &[Permission::FineLocation, Permission::CoarseLocation]
            );
            self.permission_calls.fetch_add(1, Ordering::SeqCst);
            self.decision
        }

        async fn request_fix(&self, _request: &FixRequest) -> Result<Coordinate, LocationError> {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            self.fix
                .map_err(|()| LocationError::Unavailable("scripted failure".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        notices: Mutex<Vec<Notice>>,
    }

    impl ScreenSink for RecordingSink {
        fn render(&self, _view: &crate::present::WeatherView) {}

        fn notice(&self, notice: Notice) {
            self.notices.lock().expect("lock").push(notice);
        }

        fn progress_started(&self) {}

        fn progress_dismissed(&self) {}
    }

    fn fix() -> Coordinate {
        Coordinate {
            latitude: 37.7749,
            longitude: -122.4194,
        }
    }

    #[tokio::test]
    async fn grant_requests_exactly_one_fix() {
        let service = ScriptedService::new(true, PermissionDecision::Granted, Ok(fix()));
        let sink = RecordingSink::default();

        let coordinate = acquire_fix(&service, &sink, &FixRequest::default())
            .await
            .expect("fix");

        assert_eq!(coordinate, fix());
        assert_eq!(service.permission_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.fix_calls.load(Ordering::SeqCst), 1);
        assert!(sink.notices.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn denial_never_requests_a_fix() {
        let service = ScriptedService::new(true, PermissionDecision::Denied, Ok(fix()));
        let sink = RecordingSink::default();

        let err = acquire_fix(&service, &sink, &FixRequest::default())
            .await
            .expect_err("denied");

        assert!(matches!(err, LocationError::PermissionDenied));
        assert_eq!(service.fix_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            *sink.notices.lock().expect("lock"),
            vec![Notice::PermissionRationale]
        );
    }

    #[tokio::test]
    async fn disabled_provider_notices_but_continues() {
        let service = ScriptedService::new(false, PermissionDecision::Granted, Ok(fix()));
        let sink = RecordingSink::default();

        let coordinate = acquire_fix(&service, &sink, &FixRequest::default())
            .await
            .expect("fix");

        assert_eq!(coordinate, fix());
        assert_eq!(
            *sink.notices.lock().expect("lock"),
            vec![Notice::LocationProviderDisabled]
        );
    }

    #[tokio::test]
    async fn fix_failure_is_propagated() {
        let service = ScriptedService::new(true, PermissionDecision::Granted, Err(()));
        let sink = RecordingSink::default();

        let err = acquire_fix(&service, &sink, &FixRequest::default())
            .await
            .expect_err("failure");
        assert!(matches!(err, LocationError::Unavailable(_)));
        assert_eq!(service.fix_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ip_locator_parses_a_successful_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 37.7749,
                "lon": -122.4194
            })))
            .mount(&server)
            .await;

        let locator = IpLocator::new(server.uri(), None).expect("locator");
        let coordinate = locator.locate().await.expect("coordinate");
        assert_eq!(coordinate, fix());
    }

    #[tokio::test]
    async fn ip_locator_rejects_a_failed_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail"
            })))
            .mount(&server)
            .await;

        let locator = IpLocator::new(server.uri(), None).expect("locator");
        let err = locator.locate().await.expect_err("failure");
        assert!(matches!(err, LocationError::Unavailable(_)));
    }
}
