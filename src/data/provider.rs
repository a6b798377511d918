use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Holds the latest value of some backend data and notifies subscribers when
/// it changes. Consumers only ever see the newest value; superseded ones are
/// dropped.
pub struct DataProvider<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for DataProvider<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> DataProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Runs `callback` with every value published after registration. The
    /// task ends once every handle to the provider has been dropped.
    pub fn on_change<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(T) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let value = rx.borrow_and_update().clone();
                callback(value);
            }
        })
    }
}
