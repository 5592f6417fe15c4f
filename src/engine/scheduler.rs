//! Frame scheduling
//!
//! The engine never loops on its own. It asks a `FrameScheduler` for one
//! callback at a time and the host calls `on_frame` with the handle it was
//! given. Cancelling a handle guarantees that frame is never delivered.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Identifies one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's animation-frame facility
pub trait FrameScheduler {
    /// Ask for one callback; `None` when the host could not schedule it
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Withdraw a request that has not been delivered yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

/// Headless scheduler driven by hand
///
/// Clones share one queue, so a test can keep a clone while the engine owns
/// the boxed instance.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest outstanding request, removed from the queue
    pub fn next_frame(&self) -> Option<FrameHandle> {
        self.queue.borrow_mut().pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Total requests ever made
    pub fn requested(&self) -> u64 {
        self.queue.borrow().requested
    }

    pub fn cancelled(&self) -> u64 {
        self.queue.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let mut q = self.queue.borrow_mut();
        q.next_id += 1;
        q.requested += 1;
        let handle = FrameHandle(q.next_id);
        q.pending.push_back(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut q = self.queue.borrow_mut();
        let before = q.pending.len();
        q.pending.retain(|&h| h != handle);
        if q.pending.len() != before {
            q.cancelled += 1;
        }
    }
}

/// Deliver up to `frames` scheduled frames, `dt_ms` apart
///
/// Stops early once nothing is scheduled. Returns the timestamp of the last
/// delivered frame.
pub fn pump<C>(cabinet: &mut C, scheduler: &ManualScheduler, frames: u32, start_ms: f64, dt_ms: f64) -> f64
where
    C: super::Cabinet + ?Sized,
{
    let mut now = start_ms;
    for _ in 0..frames {
        let Some(handle) = scheduler.next_frame() else {
            break;
        };
        now += dt_ms;
        cabinet.on_frame(handle, now);
    }
    now
}

/// `requestAnimationFrame` on the browser window
#[cfg(target_arch = "wasm32")]
pub mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{FrameHandle, FrameScheduler};

    /// Calls `deliver` with the handle and the RAF timestamp
    pub struct RafScheduler {
        deliver: Rc<dyn Fn(FrameHandle, f64)>,
    }

    impl RafScheduler {
        pub fn new(deliver: impl Fn(FrameHandle, f64) + 'static) -> Self {
            Self {
                deliver: Rc::new(deliver),
            }
        }
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            let Some(window) = web_sys::window() else {
                log::warn!("no window; frame not scheduled");
                return None;
            };
            let id = Rc::new(Cell::new(0i32));
            let deliver = self.deliver.clone();
            let id_in_cb = id.clone();
            // Freed by wasm-bindgen after it runs once
            let callback = Closure::once_into_js(move |time: f64| {
                deliver(FrameHandle(id_in_cb.get() as u64), time);
            });
            match window.request_animation_frame(callback.unchecked_ref()) {
                Ok(raf_id) => {
                    id.set(raf_id);
                    Some(FrameHandle(raf_id as u64))
                }
                Err(e) => {
                    log::warn!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0 as i32);
            }
        }
    }
}
