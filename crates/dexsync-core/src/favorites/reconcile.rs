// ── Sync on reconnect ──

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::store::FavoritesStore;
use crate::connectivity::{ConnectivityMonitor, Reachability};
use crate::storage::Storage;

/// Run `favorites.sync()` whenever `monitor` goes from offline to online,
/// until `cancel` fires.
pub fn spawn_auto_sync<S, R>(
    monitor: &ConnectivityMonitor,
    favorites: FavoritesStore<S, R>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    S: Storage,
    R: Reachability,
{
    let mut rx = monitor.subscribe();
    let mut was_online = rx.borrow_and_update().is_online;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = rx.borrow_and_update().is_online;
                    if online && !was_online {
                        info!("connectivity restored, syncing favorites");
                        let outcome = favorites.sync().await;
                        debug!(?outcome, "auto-sync finished");
                    }
                    was_online = online;
                }
            }
        }
        debug!("auto-sync task stopped");
    })
}
