//! Tracked events and their store-facing representation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The client-side hook that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookType {
    /// `useTrack`: a free-form tracked event.
    TrackEvent,
    /// An event bound to a specific DOM element.
    TrackElementEvent,
    /// Time spent on a page or in a component.
    TrackDuration,
    /// Click tracking.
    TrackClicks,
    /// Element visibility tracking.
    TrackVisibility,
}

impl HookType {
    /// All known hook types.
    pub const ALL: [HookType; 5] = [
        HookType::TrackEvent,
        HookType::TrackElementEvent,
        HookType::TrackDuration,
        HookType::TrackClicks,
        HookType::TrackVisibility,
    ];

    /// Wire and storage name of the hook type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrackEvent => "track_event",
            Self::TrackElementEvent => "track_element_event",
            Self::TrackDuration => "track_duration",
            Self::TrackClicks => "track_clicks",
            Self::TrackVisibility => "track_visibility",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the five known hook types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hook type '{0}'")]
pub struct UnknownHookType(pub String);

impl FromStr for HookType {
    type Err = UnknownHookType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| UnknownHookType(s.to_string()))
    }
}

/// HTML element details attached to element-bound events. Debugging only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Serialized element reference.
    #[serde(default, alias = "elementRef", skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<String>,
    /// Element `id` attribute.
    #[serde(default, alias = "elementId", skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// CSS selector for the element.
    #[serde(default, alias = "elementSelector", skip_serializing_if = "Option::is_none")]
    pub element_selector: Option<String>,
    /// DOM path to the element.
    #[serde(default, alias = "elementPath", skip_serializing_if = "Option::is_none")]
    pub element_path: Option<String>,
}

/// A validated tracked event.
///
/// Only produced by the event validator; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Registered platform customer that owns the website.
    pub user_id: String,
    /// Tracked website.
    pub website_id: String,
    /// Hook that produced the event.
    pub hook_type: HookType,
    /// Free-form label such as `cta_button_click`.
    pub event_type: String,
    /// Periodic context sent independently of user actions.
    pub default_metadata: Map<String, Value>,
    /// The tracked payload.
    pub core_metadata: Map<String, Value>,
    /// Element details, when the hook is element-bound.
    pub element_metadata: Option<ElementMetadata>,
    /// When the event happened on the client.
    pub timestamp: DateTime<Utc>,
}

/// The row written to the analytics store for one [`Event`].
///
/// Metadata maps are carried as serialized JSON so the store layer never
/// needs to know their shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: String,
    pub website_id: String,
    pub hook_type: String,
    pub event_type: String,
    pub default_metadata: String,
    pub core_metadata: String,
    pub element_metadata: String,
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Encode an event for storage.
    pub fn encode(event: &Event) -> Result<Self, serde_json::Error> {
        let element_metadata = match &event.element_metadata {
            Some(element) => serde_json::to_string(element)?,
            None => "{}".to_string(),
        };

        Ok(Self {
            user_id: event.user_id.clone(),
            website_id: event.website_id.clone(),
            hook_type: event.hook_type.as_str().to_string(),
            event_type: event.event_type.clone(),
            default_metadata: serde_json::to_string(&event.default_metadata)?,
            core_metadata: serde_json::to_string(&event.core_metadata)?,
            element_metadata,
            timestamp: event.timestamp,
        })
    }
}
