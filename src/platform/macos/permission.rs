//! Accessibility trust check.
//!
//! Synthetic events are dropped by the window server unless the process is
//! listed under System Settings > Privacy & Security > Accessibility.

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;

use crate::platform::PermissionGate;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrustedWithOptions(
        options: core_foundation::dictionary::CFDictionaryRef,
    ) -> bool;
}

/// Queries (and optionally requests) Accessibility permission.
pub struct AccessibilityGate;

impl PermissionGate for AccessibilityGate {
    /// With `prompt_if_needed` the system shows its one-time consent dialog for
    /// an untrusted process. The dialog is asynchronous: this still returns
    /// `false` until the user grants access and the caller asks again.
    fn check_permission(&self, prompt_if_needed: bool) -> bool {
        let key = CFString::new("AXTrustedCheckOptionPrompt");
        let value = if prompt_if_needed {
            CFBoolean::true_value()
        } else {
            CFBoolean::false_value()
        };
        let options = CFDictionary::from_CFType_pairs(&[(key, value)]);

        let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) };
        log::debug!(
            "permission: trusted={} (prompt_if_needed={})",
            trusted,
            prompt_if_needed
        );
        trusted
    }
}
