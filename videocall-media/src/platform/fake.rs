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

//! In-memory media platform.
//!
//! [`FakeMediaDevices`] behaves like `navigator.mediaDevices` with a scripted device list: it
//! hands out tracks that can be stopped and enabled, fails the way a browser does for unknown,
//! busy or denied devices, and records every constraint it was asked for. Clones share state, so
//! a test can keep one handle and give another to the session.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;

use crate::constraints::{MediaConstraints, TrackConstraint};
use crate::error::{MediaError, Result};
use crate::media_devices::{DeviceDescriptor, DeviceKind};
use crate::provider::{MediaDevicesProvider, MediaStream, MediaTrack, TrackKind};

#[derive(Debug)]
struct FakeTrackInner {
    id: String,
    kind: TrackKind,
    label: String,
    device_id: String,
    enabled: Cell<bool>,
    live: Cell<bool>,
}

/// A track handed out by [`FakeMediaDevices`].
#[derive(Clone, Debug)]
pub struct FakeTrack {
    inner: Rc<FakeTrackInner>,
}

impl FakeTrack {
    /// The device this track captures from.
    pub fn device_id(&self) -> &str {
        &self.inner.device_id
    }

    /// True if both handles refer to the same underlying track.
    pub fn same_track(&self, other: &FakeTrack) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl MediaTrack for FakeTrack {
    fn id(&self) -> String {
        self.inner.id.clone()
    }

    fn kind(&self) -> TrackKind {
        self.inner.kind
    }

    fn label(&self) -> String {
        self.inner.label.clone()
    }

    fn enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.set(enabled);
    }

    fn stop(&self) {
        self.inner.live.set(false);
    }

    fn is_live(&self) -> bool {
        self.inner.live.get()
    }
}

#[derive(Default)]
struct FakeState {
    devices: RefCell<Vec<DeviceDescriptor>>,
    deny_permission: Cell<bool>,
    fail_enumeration: Cell<bool>,
    yield_on_acquire: Cell<bool>,
    busy: RefCell<HashSet<String>>,
    requests: RefCell<Vec<MediaConstraints>>,
    issued: RefCell<Vec<MediaStream<FakeTrack>>>,
    next_id: Cell<u64>,
}

/// Scripted [`MediaDevicesProvider`] for tests and headless hosts.
#[derive(Clone, Default)]
pub struct FakeMediaDevices {
    state: Rc<FakeState>,
}

impl FakeMediaDevices {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        let fake = Self::default();
        fake.set_devices(devices);
        fake
    }

    /// Replaces the attached devices, as if hardware was plugged in or out.
    pub fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
        *self.state.devices.borrow_mut() = devices;
    }

    pub fn add_device(&self, device: DeviceDescriptor) {
        self.state.devices.borrow_mut().push(device);
    }

    pub fn remove_device(&self, device_id: &str) {
        self.state
            .devices
            .borrow_mut()
            .retain(|device| device.device_id != device_id);
    }

    /// Makes every acquisition fail with [`MediaError::PermissionDenied`].
    pub fn deny_permission(&self, deny: bool) {
        self.state.deny_permission.set(deny);
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.state.fail_enumeration.set(fail);
    }

    /// Marks a device as in use by another application.
    pub fn set_busy(&self, device_id: &str, busy: bool) {
        let mut set = self.state.busy.borrow_mut();
        if busy {
            set.insert(device_id.to_string());
        } else {
            set.remove(device_id);
        }
    }

    /// Suspends each acquisition once before it resolves, so concurrent calls interleave the way
    /// they would against a real platform.
    pub fn yield_on_acquire(&self, enabled: bool) {
        self.state.yield_on_acquire.set(enabled);
    }

    /// Every constraint passed to `get_user_media`, in call order.
    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.state.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<MediaConstraints> {
        self.state.requests.borrow().last().cloned()
    }

    /// Every stream successfully handed out, in call order.
    pub fn issued_streams(&self) -> Vec<MediaStream<FakeTrack>> {
        self.state.issued.borrow().clone()
    }

    /// Number of handed-out tracks that have not been stopped.
    pub fn live_track_count(&self) -> usize {
        self.state
            .issued
            .borrow()
            .iter()
            .flat_map(|stream| stream.tracks().iter())
            .filter(|track| track.is_live())
            .count()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        format!("{prefix}-{id}")
    }

    fn pick_device(
        &self,
        kind: TrackKind,
        constraint: &TrackConstraint,
    ) -> Result<Option<DeviceDescriptor>> {
        let device_kind = DeviceKind::input_for(kind);
        let devices = self.state.devices.borrow();
        let mut candidates = devices
            .iter()
            .filter(|device| device.kind == device_kind && device.is_selectable());

        let device = match constraint {
            TrackConstraint::Any(false) => return Ok(None),
            TrackConstraint::Any(true) => candidates.next().ok_or_else(|| {
                MediaError::AcquisitionFailed(format!("NotFoundError: no {kind} device attached"))
            })?,
            TrackConstraint::Exact(id) => candidates
                .find(|device| &device.device_id == id)
                .ok_or_else(|| {
                    MediaError::AcquisitionFailed(format!(
                        "OverconstrainedError: no {kind} device with id {id}"
                    ))
                })?,
        };

        if self.state.busy.borrow().contains(&device.device_id) {
            return Err(MediaError::AcquisitionFailed(format!(
                "NotReadableError: {} is in use",
                device.device_id
            )));
        }
        Ok(Some(device.clone()))
    }

    fn make_track(&self, kind: TrackKind, device: DeviceDescriptor) -> FakeTrack {
        FakeTrack {
            inner: Rc::new(FakeTrackInner {
                id: self.next_id("track"),
                kind,
                label: device.label,
                device_id: device.device_id,
                enabled: Cell::new(true),
                live: Cell::new(true),
            }),
        }
    }
}

#[async_trait(?Send)]
impl MediaDevicesProvider for FakeMediaDevices {
    type Track = FakeTrack;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        if self.state.fail_enumeration.get() {
            return Err(MediaError::EnumerationFailed(
                "enumerateDevices() rejected".to_string(),
            ));
        }
        Ok(self.state.devices.borrow().clone())
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream<FakeTrack>> {
        self.state.requests.borrow_mut().push(constraints.clone());

        if self.state.yield_on_acquire.get() {
            YieldNow::default().await;
        }

        if self.state.deny_permission.get() {
            return Err(MediaError::PermissionDenied(
                "NotAllowedError: Permission denied".to_string(),
            ));
        }
        if !constraints.audio.is_requested() && !constraints.video.is_requested() {
            return Err(MediaError::AcquisitionFailed(
                "TypeError: at least one of audio and video must be requested".to_string(),
            ));
        }

        let audio = self.pick_device(TrackKind::Audio, &constraints.audio)?;
        let video = self.pick_device(TrackKind::Video, &constraints.video)?;

        let mut tracks = Vec::new();
        if let Some(device) = audio {
            tracks.push(self.make_track(TrackKind::Audio, device));
        }
        if let Some(device) = video {
            tracks.push(self.make_track(TrackKind::Video, device));
        }

        let stream = MediaStream::new(self.next_id("stream"), tracks);
        self.state.issued.borrow_mut().push(stream.clone());
        Ok(stream)
    }
}

#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
