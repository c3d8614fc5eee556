//! Service dumps over binder, the transport behind [`crate::android`].

use std::{
    cell::RefCell,
    collections::HashMap,
    hash::BuildHasherDefault,
    io::{self, PipeWriter, Read as _},
    ops::Deref,
    sync::{
        Arc,
        atomic::{AtomicI32, Ordering},
    },
};

use rsbinder::{ProcessState, SIBinder, StatusCode, hub};
use twox_hash::XxHash3_64;

use crate::{Result, error::Error, task_thread::TaskThread};

/// Text dump of a system service, `dumpsys <service> <args..>`.
pub trait ServiceDump {
    fn dump(&self, service_name: &str, args: &[&str]) -> Result<String>;
}

#[repr(transparent)]
pub(crate) struct DumpArgs {
    inner: Box<[String]>,
}

impl FromIterator<String> for DumpArgs {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let inner: Box<[String]> = iter.into_iter().collect();
        Self { inner }
    }
}

impl Deref for DumpArgs {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub(crate) type StatusI32Slot = Arc<AtomicI32>;

pub(crate) enum Task {
    Dump(DumpArgs, PipeWriter, SIBinder, StatusI32Slot),
    Shutdown,
}

type XxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<XxHash3_64>>;

/// Binder handles of the services dumped so far, looked up on first use.
///
/// Dropping [`BinderDumpsys`] exits the background piping thread.
///
/// # Example
///
/// ```no_run
/// use usage_history::dumpsys::{BinderDumpsys, ServiceDump};
///
/// # fn foo() -> Result<(), usage_history::error::Error> {
/// let dumpsys = BinderDumpsys::new()?;
/// let users = dumpsys.dump("user", &[])?;
/// # Ok(())
/// # }
/// ```
pub struct BinderDumpsys {
    services: RefCell<XxHashMap<Box<str>, SIBinder>>,
    task_thread: TaskThread,
}

impl BinderDumpsys {
    pub fn new() -> Result<Self> {
        _ = ProcessState::init_default();

        Ok(Self {
            services: RefCell::new(XxHashMap::default()),
            task_thread: TaskThread::spawn(),
        })
    }

    /// Blocks for a few seconds if the service is not registered yet.
    fn service(&self, service_name: &str) -> Result<SIBinder> {
        if let Some(service) = self.services.borrow().get(service_name) {
            return Ok(service.clone());
        }

        let service = hub::get_service(service_name)
            .ok_or_else(|| Error::ServiceNotExist(Box::from(service_name)))?;

        tracing::trace!(service_name, "binder service retrieved");

        self.services
            .borrow_mut()
            .insert(Box::from(service_name), service.clone());

        Ok(service)
    }
}

impl ServiceDump for BinderDumpsys {
    fn dump(&self, service_name: &str, args: &[&str]) -> Result<String> {
        let service = self.service(service_name)?;

        tracing::debug!(service_name, ?args, "dumping service");

        dump_inner(&self.task_thread, service, args)
    }
}

fn dump_inner(task_thread: &TaskThread, service: SIBinder, args: &[&str]) -> Result<String> {
    let (mut reader, writer) = io::pipe()?;

    let status_i32 = Arc::new(AtomicI32::new(i32::from(StatusCode::Ok)));

    task_thread
        .send(Task::Dump(
            DumpArgs::from_iter(args.iter().copied().map(String::from)),
            writer,
            service,
            status_i32.clone(),
        ))
        .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "task_thread dropped receiver"))?;

    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;

    let status_code = StatusCode::from(status_i32.load(Ordering::Relaxed));
    if !matches!(status_code, StatusCode::Ok) {
        Err(status_code)?;
    }

    Ok(buf)
}
