//! Background sensor poller: refreshes the `sensor` table on an interval and
//! keeps only the latest snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control::presets::sensor_request;
use crate::ipmi::{GatewayError, IpmiGateway, IpmiResponse};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub taken_at: DateTime<Utc>,
    #[serde(flatten)]
    pub response: IpmiResponse,
}

pub struct SensorPoller {
    gateway: Arc<IpmiGateway>,
    interval: Duration,
    latest: RwLock<Option<SensorSnapshot>>,
}

impl SensorPoller {
    pub fn new(gateway: Arc<IpmiGateway>, interval: Duration) -> Self {
        Self { gateway, interval, latest: RwLock::new(None) }
    }

    pub async fn latest(&self) -> Option<SensorSnapshot> {
        self.latest.read().await.clone()
    }

    /// Take one reading and store it. Returns `None` when cancelled mid-flight;
    /// the previous snapshot is kept in that case.
    pub async fn poll_once(&self, cancel: &CancellationToken) -> Option<SensorSnapshot> {
        let result = self.gateway.execute_with_cancel(&sensor_request(), cancel).await;

        if let Err(GatewayError::Cancelled) = result {
            return None;
        }
        if let Err(e) = &result {
            warn!("Sensor poll failed: {}", e);
        }

        let snapshot = SensorSnapshot { taken_at: Utc::now(), response: result.into() };
        *self.latest.write().await = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Poll until `shutdown` fires. The first reading is taken immediately.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!("Sensor poller started (every {:?})", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Some(snapshot) = self.poll_once(&shutdown).await {
                        debug!("Sensor snapshot updated (success: {})", snapshot.response.success);
                    }
                }
            }
        }

        info!("Sensor poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::credentials::{CredentialSource, HOST_VAR, PASSWORD_VAR, USERNAME_VAR};
    use crate::config::types::IpmiSettings;
    use crate::ipmi::IpmiData;
    use crate::system::executor::testing::ScriptedRunner;

    fn poller(runner: Arc<ScriptedRunner>, credentials: CredentialSource) -> Arc<SensorPoller> {
        let gateway = Arc::new(IpmiGateway::new(IpmiSettings::default(), credentials, runner));
        Arc::new(SensorPoller::new(gateway, Duration::from_millis(10)))
    }

    fn credentials() -> CredentialSource {
        CredentialSource::from_pairs([(HOST_VAR, "bmc"), (USERNAME_VAR, "root"), (PASSWORD_VAR, "pw")])
    }

    #[tokio::test]
    async fn poll_once_stores_latest_snapshot() {
        let runner = Arc::new(ScriptedRunner::stdout("CPU Temp | 45 | degrees C | ok"));
        let poller = poller(runner, credentials());
        assert!(poller.latest().await.is_none());

        poller.poll_once(&CancellationToken::new()).await.unwrap();

        let snapshot = poller.latest().await.unwrap();
        assert!(snapshot.response.success);
        assert!(matches!(snapshot.response.data, Some(IpmiData::Sensors(ref rows)) if rows.len() == 1));
    }

    #[tokio::test]
    async fn failures_are_stored_too() {
        let runner = Arc::new(ScriptedRunner::stdout("unused"));
        let poller = poller(runner.clone(), CredentialSource::from_pairs(Vec::<(String, String)>::new()));

        let snapshot = poller.poll_once(&CancellationToken::new()).await.unwrap();
        assert!(!snapshot.response.success);
        assert_eq!(runner.spawns(), 0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let runner = Arc::new(ScriptedRunner::stdout("FAN1 | 3360 | RPM | ok"));
        let poller = poller(runner.clone(), credentials());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(Arc::clone(&poller).run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(runner.spawns() >= 1);
        assert!(poller.latest().await.is_some());
    }
}
