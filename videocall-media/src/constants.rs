/// Namespace under which the device preferences are persisted.
pub const STORAGE_KEY: &str = "videocall-media-preferences";

// Label fragments used to spot a rear-facing camera. Matched case-insensitively.
pub const ENVIRONMENT_CAMERA_LABEL: &str = "environment";
pub const BACK_CAMERA_LABEL: &str = "back";

/// Capacity of the session event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// Used by `ProjectDirs` to locate the native preference file.
pub const APP_QUALIFIER: &str = "dev";
pub const APP_ORGANIZATION: &str = "securityunion";
pub const APP_NAME: &str = "videocall";
