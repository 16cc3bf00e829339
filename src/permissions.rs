//! Known privacy usage keys and entitlement identifiers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

const PRIVACY_ENTRIES: &[(&str, &str)] = &[
    ("NSCameraUsageDescription", "Camera access"),
    ("NSMicrophoneUsageDescription", "Microphone access"),
    ("NSPhotoLibraryUsageDescription", "Photo Library access"),
    ("NSPhotoLibraryAddUsageDescription", "Photo Library write access"),
    ("NSLocationWhenInUseUsageDescription", "Location access when in use"),
    ("NSLocationAlwaysAndWhenInUseUsageDescription", "Location access always"),
    ("NSContactsUsageDescription", "Contacts access"),
    ("NSCalendarsUsageDescription", "Calendar access"),
    ("NSRemindersUsageDescription", "Reminders access"),
    ("NSMotionUsageDescription", "Motion and fitness access"),
    ("NSHealthUpdateUsageDescription", "Health data write access"),
    ("NSHealthShareUsageDescription", "Health data read access"),
    ("NSBluetoothAlwaysUsageDescription", "Bluetooth access"),
    ("NSBluetoothPeripheralUsageDescription", "Bluetooth peripheral access"),
    ("NSLocalNetworkUsageDescription", "Local network access"),
    ("NSSpeechRecognitionUsageDescription", "Speech recognition access"),
    ("NSFaceIDUsageDescription", "Face ID access"),
    ("NSAppleMusicUsageDescription", "Apple Music access"),
    ("NSMediaLibraryUsageDescription", "Media library access"),
    ("NSNearbyInteractionUsageDescription", "Nearby interaction access"),
];

const ENTITLEMENT_ENTRIES: &[(&str, &str)] = &[
    // Core
    ("com.apple.security.application-groups", "Application groups"),
    ("com.apple.developer.siri", "Siri integration"),
    ("com.apple.developer.healthkit", "HealthKit access"),
    ("com.apple.developer.game-center", "Game Center"),
    ("com.apple.developer.networking.networkextension", "Network extensions"),
    ("com.apple.developer.networking.vpn.api", "VPN configuration"),
    ("com.apple.developer.devicecheck.appattest-environment", "App Attest"),
    ("com.apple.external-accessory.wireless-configuration", "Wireless accessory configuration"),
    ("com.apple.developer.networking.wifi-info", "WiFi information access"),
    ("com.apple.developer.networking.multipath", "Multipath networking"),
    ("com.apple.developer.associated-domains", "Associated domains"),
    ("com.apple.developer.default-data-protection", "Data protection"),
    ("com.apple.developer.kernel.increased-memory-limit", "Increased memory limit"),
    ("com.apple.developer.kernel.extended-virtual-addressing", "Extended virtual addressing"),
    // System
    ("keychain-access-groups", "Keychain access groups"),
    ("com.apple.developer.team-identifier", "Team identifier"),
    ("get-task-allow", "Debuggable (get-task-allow)"),
    ("com.apple.security.get-task-allow", "Debuggable (security variant)"),
    // iCloud
    ("com.apple.developer.icloud-container-identifiers", "iCloud containers"),
    ("com.apple.developer.icloud-services", "iCloud services"),
    ("com.apple.developer.ubiquity-kvstore-identifier", "iCloud key-value storage"),
    ("com.apple.developer.ubiquity-container-identifiers", "iCloud document containers"),
    // Networking
    ("com.apple.developer.networking.HotspotConfiguration", "Hotspot configuration"),
    ("com.apple.developer.networking.slicing", "Network slicing"),
    ("com.apple.developer.networking.custom-protocol", "Custom network protocols"),
    ("com.apple.developer.networking.bluetooth", "Bluetooth networking"),
    // Media
    ("com.apple.developer.coremedia.hls.low-latency", "Low-latency HLS"),
    ("com.apple.developer.avfoundation.multitasking-camera-access", "Background camera access"),
    ("com.apple.developer.media-device-discovery-extension", "Media device discovery"),
    // CarPlay
    ("com.apple.developer.carplay-audio", "CarPlay audio"),
    ("com.apple.developer.carplay-communication", "CarPlay communication"),
    ("com.apple.developer.carplay-messaging", "CarPlay messaging"),
    ("com.apple.developer.carplay-navigation", "CarPlay navigation"),
    ("com.apple.developer.carplay-parking", "CarPlay parking"),
    ("com.apple.developer.carplay-quick-ordering", "CarPlay quick ordering"),
    ("com.apple.developer.carplay-charging", "CarPlay EV charging"),
    ("com.apple.developer.carplay-driving-task", "CarPlay driving task"),
    // Notifications
    ("com.apple.developer.usernotifications.communication", "Communication notifications"),
    ("com.apple.developer.usernotifications.critical-alerts", "Critical alert notifications"),
    ("com.apple.developer.usernotifications.time-sensitive", "Time sensitive notifications"),
    ("aps-environment", "Push notifications environment"),
    // Background
    ("com.apple.developer.background-processing", "Background processing"),
    ("com.apple.developer.background-modes", "Background modes"),
    // Sandbox exceptions
    ("com.apple.security.exception.files.absolute-path.read-only", "Absolute path file read access"),
    ("com.apple.security.exception.files.absolute-path.read-write", "Absolute path file write access"),
    ("com.apple.security.exception.files.home-relative-path.read-only", "Home relative file read access"),
    ("com.apple.security.exception.files.home-relative-path.read-write", "Home relative file write access"),
    ("com.apple.security.exception.mach-lookup.global-name", "Mach service lookup"),
    ("com.apple.security.exception.shared-preference.read-only", "Shared preference read access"),
    ("com.apple.security.exception.shared-preference.read-write", "Shared preference write access"),
    ("com.apple.security.temporary-exception.files.absolute-path.read-only", "Temporary file read access"),
    ("com.apple.security.temporary-exception.files.absolute-path.read-write", "Temporary file write access"),
    // Hardware
    ("com.apple.developer.nfc.readersession.formats", "NFC reader session"),
    ("com.apple.developer.nfc.readersession.iso7816.select-identifiers", "NFC ISO7816 identifiers"),
    ("com.apple.developer.proximity-reader.payment.acceptance", "Tap to Pay acceptance"),
    // Commerce
    ("com.apple.developer.in-app-payments", "In-app payments"),
    ("com.apple.developer.storekit.external-purchase-link", "External purchase links"),
    // System integration
    ("com.apple.developer.weatherkit", "WeatherKit access"),
    ("com.apple.developer.shared-with-you", "Shared with You"),
    ("com.apple.developer.devicecheck.appattest-environment", "App Attest environment"),
    ("com.apple.developer.applesignin", "Sign in with Apple"),
    ("com.apple.developer.group-session", "SharePlay group sessions"),
    ("com.apple.developer.ClassKit-environment", "ClassKit environment"),
    ("com.apple.developer.maps", "MapKit"),
    // Browser engines
    ("com.apple.developer.web-browser-engine.webcontent", "Web browser engine"),
    ("com.apple.developer.web-browser-engine.networking", "Web browser networking"),
    ("com.apple.developer.web-browser-engine.rendering", "Web browser rendering"),
    // Private
    ("com.apple.private.security.no-container", "No container restriction"),
    ("com.apple.private.security.storage.AppDataContainers", "App data container access"),
    ("com.apple.runningboard.primitiveattribute", "RunningBoard primitive attributes"),
    ("com.apple.frontboard.launchapplications", "Launch applications"),
    // Legacy
    ("inter-app-audio", "Inter-App Audio"),
    ("application-identifier", "Application identifier"),
    ("beta-reports-active", "Beta reporting"),
    // Sideload / jailbreak
    ("platform-application", "Platform application"),
    ("com.apple.private.skip-library-validation", "Skip library validation"),
    ("com.apple.private.security.no-sandbox", "No sandbox restriction"),
    ("com.apple.springboard.opensensitiveurl", "Open sensitive URLs"),
    ("com.apple.multitasking.systemappassertions", "System app assertions"),
    ("com.apple.backboardd.launchapplications", "Backboard launch applications"),
    ("com.apple.developer.system-extension.install", "System extension install"),
    ("com.apple.developer.driverkit", "DriverKit access"),
    ("com.apple.developer.kernel.extended-virtual-addressing", "Extended virtual addressing"),
    ("com.apple.developer.kernel.increased-memory-limit", "Increased memory limit"),
];

/// Later entries win when an identifier is listed twice.
fn build_table(entries: &[(&'static str, &'static str)]) -> BTreeMap<&'static str, &'static str> {
    entries.iter().copied().collect()
}

/// Info.plist privacy usage keys and their fallback labels.
pub static PRIVACY_DESCRIPTIONS: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_table(PRIVACY_ENTRIES));

/// Entitlement identifiers worth surfacing in a source listing.
pub static ENTITLEMENT_LABELS: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_table(ENTITLEMENT_ENTRIES));

pub fn privacy_fallback(key: &str) -> Option<&'static str> {
    PRIVACY_DESCRIPTIONS.get(key).copied()
}

pub fn entitlement_label(key: &str) -> Option<&'static str> {
    ENTITLEMENT_LABELS.get(key).copied()
}
