//! Validation layer debug callback
//!
//! Routes Vulkan validation messages into the Lumina logging system so
//! driver diagnostics share the same output as engine logs.

use ash::vk;
use std::borrow::Cow;
use std::ffi::CStr;
use std::os::raw::c_void;

use crate::log::{self, LogSeverity};

/// Debug messenger callback registered when validation is enabled
///
/// # Safety
///
/// Called by the Vulkan loader with a valid callback-data pointer.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let callback_data = *p_callback_data;

    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let severity = if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Trace
    };

    log::log(
        severity,
        "lumina::validation",
        format!("{:?}: {}", message_type, message),
    );

    vk::FALSE
}
