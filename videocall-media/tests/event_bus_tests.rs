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

//! Integration tests for the events a session publishes on its bus.

#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use std::rc::Rc;

    use videocall_media::{
        DeviceDescriptor, DeviceKind, EventBus, FakeMediaDevices, MediaEvent, MediaSessionManager,
        MediaSessionOptions, PreferenceStore, TrackKind,
    };

    fn session(fake: &FakeMediaDevices) -> MediaSessionManager<FakeMediaDevices> {
        let _ = env_logger::builder().is_test(true).try_init();
        MediaSessionManager::new(
            fake.clone(),
            Rc::new(PreferenceStore::in_memory()),
            MediaSessionOptions::default(),
        )
    }

    fn devices() -> Vec<DeviceDescriptor> {
        vec![
            DeviceDescriptor::new("mic-1", DeviceKind::AudioInput, "Microphone"),
            DeviceDescriptor::new("mic-2", DeviceKind::AudioInput, "Headset"),
            DeviceDescriptor::new("cam-1", DeviceKind::VideoInput, "Camera"),
            DeviceDescriptor::new("spk-1", DeviceKind::AudioOutput, "Speakers"),
        ]
    }

    fn drain(rx: &mut async_broadcast::Receiver<MediaEvent>) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_receiver_awaits_next_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(MediaEvent::AudioOutputChanged("spk-1".to_string()));

        let event = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("event should be delivered")
            .unwrap();
        assert_eq!(event, MediaEvent::AudioOutputChanged("spk-1".to_string()));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new();
        bus.emit(MediaEvent::PermissionGranted);

        let mut rx = bus.subscribe();
        bus.emit(MediaEvent::DevicesChanged);

        assert_eq!(drain(&mut rx), vec![MediaEvent::DevicesChanged]);
    }

    #[tokio::test]
    async fn test_switch_and_output_events() {
        let fake = FakeMediaDevices::new(devices());
        let session = session(&fake);
        session.start().await.unwrap();
        let mut rx = session.subscribe_events();

        session.switch_input("mic-2", TrackKind::Audio).await.unwrap();
        session.switch_audio_output("spk-1");
        session.toggle_video();

        assert_eq!(
            drain(&mut rx),
            vec![
                MediaEvent::InputSwitched {
                    kind: TrackKind::Audio,
                    device_id: "mic-2".to_string(),
                },
                MediaEvent::AudioOutputChanged("spk-1".to_string()),
                MediaEvent::VideoOffChanged(true),
            ]
        );
    }

    #[tokio::test]
    async fn test_denied_permission_is_published() {
        let fake = FakeMediaDevices::new(devices());
        fake.deny_permission(true);
        let session = session(&fake);
        let mut rx = session.subscribe_events();

        session.check_permission().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            MediaEvent::PermissionDenied(reason) if reason.contains("NotAllowedError")
        ));
    }

    #[tokio::test]
    async fn test_hot_plug_publishes_devices_changed() {
        let fake = FakeMediaDevices::new(devices());
        let session = session(&fake);
        session.start().await.unwrap();
        let mut rx = session.subscribe_events();

        fake.remove_device("cam-1");
        session.refresh_devices().await;

        assert_eq!(
            drain(&mut rx),
            vec![MediaEvent::DevicesLoaded(3), MediaEvent::DevicesChanged]
        );
    }

    #[tokio::test]
    async fn test_failed_switch_publishes_nothing() {
        let fake = FakeMediaDevices::new(devices());
        let session = session(&fake);
        session.start().await.unwrap();
        let mut rx = session.subscribe_events();

        fake.set_busy("mic-2", true);
        assert!(session.switch_input("mic-2", TrackKind::Audio).await.is_err());

        assert!(drain(&mut rx).is_empty());
    }
}
