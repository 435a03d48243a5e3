// Copyright (C) 2025 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A task queue that lets lifecycle events produced on any thread be handled on the thread that
//! owns the activity.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, error, info};
use std::{
    os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd},
    sync::mpsc::{self, channel, TryRecvError},
    sync::{Mutex, MutexGuard, TryLockError},
    thread,
    time::Duration,
};

macro_rules! retry_eintr {
    ($libc_call:expr) => {
        loop {
            match $libc_call {
                -1 => {
                    let e = std::io::Error::last_os_error();
                    match e.raw_os_error() {
                        Some(libc::EINTR) => continue,
                        _ => break Err(e),
                    }
                }
                result => {
                    break Ok(result);
                }
            }
        }
    };
}

/// A struct used to send tasks to `Handler`.
pub struct Sender<T: Send> {
    tx: mpsc::Sender<T>,
    waker_fd: OwnedFd,
}

impl<T: Send> Sender<T> {
    /// Send a task to the associated `Handler`.
    pub fn send(&self, task: T) -> Result<()> {
        self.tx.send(task).map_err(|_| anyhow!("Failed to send the task"))?;
        self.wake()
    }

    fn wake(&self) -> Result<()> {
        let res = retry_eintr!(
            // SAFETY: `self.waker_fd` is a valid eventfd.
            unsafe { libc::eventfd_write(self.waker_fd.as_raw_fd(), 1) }
        );
        if let Err(e) = res {
            bail!("Failed to write to the waker fd: {}", e);
        }
        Ok(())
    }
}

/// A trait defining expected behavior of callback functions for `Handler`.
pub trait HandlerCallback<T: Send> {
    /// Handle a task.
    /// This function is called on the thread that polls the `Handler` owning the callback.
    /// If this function returns Err, the handler is deactivated and this function will never be
    /// called anymore even if there is a sent task.
    fn handle_task(&mut self, task: T) -> Result<()>;
}

/// A struct representing a task handler.
pub struct Handler<T: Send, C: HandlerCallback<T>> {
    callback: C,
    event_fd: OwnedFd,
    tx: mpsc::Sender<T>,
    rx: mpsc::Receiver<T>,
    active: bool,
}

impl<T: Send, C: HandlerCallback<T>> Handler<T, C> {
    pub fn new(callback: C) -> Result<Self> {
        // SAFETY: Passing valid arguments.
        let fd: RawFd = unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) };
        if fd == -1 {
            bail!("Failed to create an eventfd: {}", std::io::Error::last_os_error());
        }
        // SAFETY: `fd` is a valid owned fd.
        let event_fd = unsafe { OwnedFd::from_raw_fd(fd) };

        let (tx, rx) = channel::<T>();
        info!("A handler is created on the thread {:?}", thread::current().id());
        Ok(Self { callback, event_fd, tx, rx, active: true })
    }

    pub fn get_sender(&self) -> Result<Sender<T>> {
        let tx = self.tx.clone();
        let waker_fd = self.event_fd.try_clone().context("Failed to clone the eventfd")?;
        Ok(Sender::<T> { tx, waker_fd })
    }

    /// The fd that becomes readable when a task is sent. An external event loop may watch it and
    /// call `handle_pending` when it fires.
    pub fn wake_fd(&self) -> RawFd {
        self.event_fd.as_raw_fd()
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Wait until a task is sent or `timeout` elapses, then handle every pending task.
    /// `None` waits forever. Returns the number of tasks handled.
    pub fn poll_once(&mut self, timeout: Option<Duration>) -> Result<usize> {
        self.ensure_active()?;
        let timeout_ms = match timeout {
            Some(timeout) => i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX),
            None => -1,
        };
        let mut pollfd =
            libc::pollfd { fd: self.event_fd.as_raw_fd(), events: libc::POLLIN, revents: 0 };
        // SAFETY: `pollfd` is a single valid pollfd entry.
        let ready = retry_eintr!(unsafe { libc::poll(&mut pollfd, 1, timeout_ms) })
            .context("Failed to poll the event fd")?;
        if ready == 0 {
            return Ok(0);
        }
        self.handle_pending()
    }

    /// Handle every task sent so far without waiting. Returns the number of tasks handled.
    pub fn handle_pending(&mut self) -> Result<usize> {
        self.ensure_active()?;
        self.drain_waker()?;

        let mut handled = 0;
        loop {
            match self.rx.try_recv() {
                Ok(task) => {
                    if let Err(e) = self.callback.handle_task(task) {
                        error!("Deactivating the handler: {:?}", e);
                        self.active = false;
                        return Err(e.context("Failed to handle a task"));
                    }
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return Ok(handled),
                Err(TryRecvError::Disconnected) => bail!("mpsc disconnected"),
            }
        }
    }

    fn drain_waker(&self) -> Result<()> {
        let mut val: libc::eventfd_t = 0;
        let res = retry_eintr!(
            // SAFETY: `self.event_fd` is a valid eventfd and `val` is properly allocated.
            unsafe { libc::eventfd_read(self.event_fd.as_raw_fd(), &mut val) }
        );
        match res {
            Ok(_) => Ok(()),
            // The counter is zero when the tasks were already drained by an earlier wakeup.
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => bail!("Failed to read from the event fd: {}", e),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if !self.active {
            bail!("The handler is deactivated");
        }
        Ok(())
    }
}

/// A `Handler` that can be reached from a static and dispatched to from inside its own callback.
///
/// `dispatch` queues the task and handles everything pending unless the handler is already busy.
/// A busy handler is either running on another thread or further up the current stack, as when
/// the platform answers a request before returning from it. Either way the task stays queued and
/// the busy caller picks it up before its drain loop ends. A task queued from another thread right
/// after that loop ends runs on the next dispatch.
pub struct SharedHandler<T: Send, C: HandlerCallback<T>> {
    sender: Sender<T>,
    handler: Mutex<Handler<T, C>>,
}

impl<T: Send, C: HandlerCallback<T>> SharedHandler<T, C> {
    pub fn new(callback: C) -> Result<Self> {
        let handler = Handler::new(callback)?;
        let sender = handler.get_sender()?;
        Ok(Self { sender, handler: Mutex::new(handler) })
    }

    /// Queue `task` and handle every pending task if the handler is free. Returns the number of
    /// tasks handled by this call.
    pub fn dispatch(&self, task: T) -> Result<usize> {
        self.sender.send(task)?;
        match self.try_lock() {
            Some(mut handler) => handler.handle_pending(),
            None => {
                debug!("The handler is busy, deferring the task");
                Ok(0)
            }
        }
    }

    /// Run `f` against the callback. Returns `None` while the handler is busy.
    pub fn with_callback<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.try_lock().map(|handler| f(handler.callback()))
    }

    fn try_lock(&self) -> Option<MutexGuard<'_, Handler<T, C>>> {
        match self.handler.try_lock() {
            Ok(handler) => Some(handler),
            // Every task is queued before it runs, so the handler state stays consistent.
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}
