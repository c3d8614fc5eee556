use std::{
    sync::{
        atomic::Ordering,
        mpsc::{self, SendError, Sender},
    },
    thread,
};

use crate::dumpsys::Task;

/// Runs binder `dump` calls off the reading thread, so a dump larger than the
/// pipe buffer cannot stall its own reader.
pub(crate) struct TaskThread {
    tx: Sender<Task>,
}

impl TaskThread {
    pub(crate) fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("usage-history-dump".into())
            .spawn(move || {
                while let Ok(task) = rx.recv() {
                    let (args, writer, service, status) = match task {
                        Task::Dump(a, w, s, e) => (a, w, s, e),
                        Task::Shutdown => break,
                    };

                    // dropping the writer hands the reader an EOF
                    let Some(proxy) = service.as_proxy() else {
                        tracing::warn!("dump target is not a binder proxy");
                        continue;
                    };

                    let _ = proxy.dump(writer, &args).inspect_err(|e| {
                        tracing::debug!("binder dump failed: {e:?}");
                        status.store(i32::from(*e), Ordering::Relaxed);
                    });
                }
            })
            .map(drop)
            .unwrap_or_else(|e| tracing::warn!("failed to spawn dump thread: {e}"));

        Self { tx }
    }

    #[inline(always)]
    pub(crate) fn send(&self, t: Task) -> Result<(), SendError<Task>> {
        self.tx.send(t)
    }
}

impl Drop for TaskThread {
    fn drop(&mut self) {
        let _ = self.tx.send(Task::Shutdown);
    }
}
