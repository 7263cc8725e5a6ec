//! Scripted host used by the unit tests. Events are delivered synchronously
//! on the calling thread.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EntryCallback, EventCallback, FrameCallback, PerformanceHost, Subscription};
use crate::{
    error::{MonitorError, Result},
    types::{EntryType, MemoryUsage, NavigationTiming, PageEvent, PerformanceEntry},
};

type SharedEntryCallback = Arc<dyn Fn(&[PerformanceEntry]) + Send + Sync>;
type SharedFrameCallback = Arc<Mutex<FrameCallback>>;

#[derive(Default)]
struct FakeState {
    next_id: usize,
    now: f64,
    loaded: bool,
    memory: Option<MemoryUsage>,
    navigation: Option<NavigationTiming>,
    unsupported: HashSet<EntryType>,
    frames_supported: bool,
    suppression_active: bool,
    /// Simulates notifications that were already queued when disconnect ran
    ignore_cancel: bool,
    observers: Vec<(usize, EntryType, SharedEntryCallback)>,
    page_listeners: Vec<(usize, PageEvent, EventCallback)>,
    frames: Vec<(usize, SharedFrameCallback)>,
}

pub(crate) struct FakeHost {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                frames_supported: true,
                ..Default::default()
            })),
        }
    }

    pub(crate) fn loaded(self, navigation: NavigationTiming) -> Self {
        {
            let mut state = self.state.lock();
            state.loaded = true;
            state.navigation = Some(navigation);
        }
        self
    }

    pub(crate) fn with_memory(self, memory: MemoryUsage) -> Self {
        self.state.lock().memory = Some(memory);
        self
    }

    pub(crate) fn without(self, entry_type: EntryType) -> Self {
        self.state.lock().unsupported.insert(entry_type);
        self
    }

    pub(crate) fn without_frames(self) -> Self {
        self.state.lock().frames_supported = false;
        self
    }

    pub(crate) fn with_suppression_active(self) -> Self {
        self.state.lock().suppression_active = true;
        self
    }

    pub(crate) fn ignoring_cancel(self) -> Self {
        self.state.lock().ignore_cancel = true;
        self
    }

    pub(crate) fn set_memory(&self, memory: MemoryUsage) {
        self.state.lock().memory = Some(memory);
    }

    pub(crate) fn set_navigation(&self, navigation: NavigationTiming) {
        self.state.lock().navigation = Some(navigation);
    }

    pub(crate) fn set_now(&self, now: f64) {
        self.state.lock().now = now;
    }

    /// Deliver one batch to every observer of `entry_type`
    pub(crate) fn emit(&self, entry_type: EntryType, entries: &[PerformanceEntry]) {
        let callbacks: Vec<SharedEntryCallback> = self
            .state
            .lock()
            .observers
            .iter()
            .filter(|(_, ty, _)| *ty == entry_type)
            .map(|(_, _, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(entries);
        }
    }

    /// Fire a page event; listeners are consumed
    pub(crate) fn fire(&self, event: PageEvent) {
        let listeners: Vec<EventCallback> = {
            let mut state = self.state.lock();
            if event == PageEvent::Load {
                state.loaded = true;
            }
            let (fired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.page_listeners)
                .into_iter()
                .partition(|(_, ev, _)| *ev == event);
            state.page_listeners = kept;
            fired.into_iter().map(|(_, _, cb)| cb).collect()
        };

        for listener in listeners {
            listener();
        }
    }

    /// Run every frame callback with timestamp `ts`
    pub(crate) fn frame(&self, ts: f64) {
        let callbacks: Vec<SharedFrameCallback> = {
            let mut state = self.state.lock();
            state.now = ts;
            state.frames.iter().map(|(_, cb)| cb.clone()).collect()
        };

        for callback in callbacks {
            let mut on_frame = callback.lock();
            (*on_frame)(ts);
        }
    }

    pub(crate) fn observer_count(&self, entry_type: EntryType) -> usize {
        self.state
            .lock()
            .observers
            .iter()
            .filter(|(_, ty, _)| *ty == entry_type)
            .count()
    }

    pub(crate) fn frame_callback_count(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub(crate) fn page_listener_count(&self) -> usize {
        self.state.lock().page_listeners.len()
    }

    fn register(&self, remove: impl Fn(&mut FakeState, usize) + Send + 'static, id: usize) -> Subscription {
        let state = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock();
                if !state.ignore_cancel {
                    remove(&mut *state, id);
                }
            }
        })
    }

    fn next_id(&self) -> usize {
        let mut state = self.state.lock();
        state.next_id += 1;
        state.next_id
    }
}

impl PerformanceHost for FakeHost {
    fn now(&self) -> f64 {
        self.state.lock().now
    }

    fn observe(&self, entry_type: EntryType, callback: EntryCallback) -> Result<Subscription> {
        if self.state.lock().unsupported.contains(&entry_type) {
            return Err(MonitorError::unsupported(format!("{} observer", entry_type.as_str())));
        }

        let id = self.next_id();
        self.state
            .lock()
            .observers
            .push((id, entry_type, Arc::from(callback)));

        Ok(self.register(|state, id| state.observers.retain(|(i, _, _)| *i != id), id))
    }

    fn memory(&self) -> Option<MemoryUsage> {
        self.state.lock().memory
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.state.lock().navigation
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    fn on_page_event(&self, event: PageEvent, callback: EventCallback) -> Result<Subscription> {
        let id = self.next_id();
        self.state.lock().page_listeners.push((id, event, callback));

        Ok(self.register(|state, id| state.page_listeners.retain(|(i, _, _)| *i != id), id))
    }

    fn request_frames(&self, callback: FrameCallback) -> Result<Subscription> {
        if !self.state.lock().frames_supported {
            return Err(MonitorError::unsupported("animation frames"));
        }

        let id = self.next_id();
        self.state
            .lock()
            .frames
            .push((id, Arc::new(Mutex::new(callback))));

        Ok(self.register(|state, id| state.frames.retain(|(i, _)| *i != id), id))
    }

    fn user_agent(&self) -> String {
        "FakeHost/1.0".to_string()
    }

    fn suppression_active(&self) -> bool {
        self.state.lock().suppression_active
    }
}
