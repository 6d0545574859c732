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

mod default_devices;
mod media_device_access;
mod media_device_list;

pub use default_devices::{resolve_default_devices, ResolvedDevices};
pub(crate) use media_device_access::request_access;
pub use media_device_access::PermissionResult;
pub use media_device_list::{DeviceDescriptor, DeviceKind, DeviceList};
