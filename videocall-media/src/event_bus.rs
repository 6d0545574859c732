/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Broadcast channel for session events.
//!
//! Each [`MediaSessionManager`](crate::MediaSessionManager) owns one bus. Every subscriber gets
//! its own receiver and sees all events emitted after it subscribed.
//!
//! # Example
//!
//! ```ignore
//! let mut rx = session.subscribe_events();
//! wasm_bindgen_futures::spawn_local(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let MediaEvent::InputSwitched { kind, device_id } = event {
//!             log::info!("{kind} input is now {device_id}");
//!         }
//!     }
//! });
//! ```

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender};

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::events::MediaEvent;

pub struct EventBus {
    sender: Sender<MediaEvent>,
    // Keeps the channel open while nobody is subscribed.
    _keep_alive: InactiveReceiver<MediaEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity);
        // Slow subscribers lose the oldest events instead of blocking the session.
        sender.set_overflow(true);
        Self {
            sender,
            _keep_alive: receiver.deactivate(),
        }
    }

    pub fn subscribe(&self) -> Receiver<MediaEvent> {
        self.sender.new_receiver()
    }

    /// Non-blocking. Events emitted while nobody is subscribed are dropped.
    pub fn emit(&self, event: MediaEvent) {
        log::debug!("media event: {event:?}");
        let _ = self.sender.try_broadcast(event);
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
