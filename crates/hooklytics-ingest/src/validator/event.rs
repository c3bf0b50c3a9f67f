//! Turns raw JSON payloads into [`Event`]s.
//!
//! Field names are accepted in snake_case (what the tracking hooks send)
//! and camelCase. Every violation of a payload is collected rather than
//! stopping at the first one.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value};

use hooklytics_core::config::IngestConfig;
use hooklytics_core::types::{ElementMetadata, Event, HookType};

use super::violation::{ValidationError, Violation};

const USER_ID: &[&str] = &["user_id", "userId"];
const WEBSITE_ID: &[&str] = &["website_id", "websiteId"];
const HOOK_TYPE: &[&str] = &["hook_type", "hookType"];
const EVENT_TYPE: &[&str] = &["event_type", "eventType"];
const DEFAULT_METADATA: &[&str] = &["default_metadata", "defaultMetadata", "default_Mmetadata"];
const CORE_METADATA: &[&str] = &["core_metadata", "coreMetadata"];
const ELEMENT_METADATA: &[&str] = &["element_metadata", "elementMetadata"];
const TIMESTAMP: &[&str] = &["timestamp"];

/// Validates event payloads. Holds no state besides its limits.
#[derive(Debug, Clone)]
pub struct EventValidator {
    max_future_skew: Duration,
    max_events_per_request: usize,
}

impl EventValidator {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            // Out-of-range skews are refused by `AppConfig::validate`.
            max_future_skew: i64::try_from(config.max_future_skew_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            max_events_per_request: config.max_events_per_request,
        }
    }

    /// Largest accepted request.
    pub fn max_events_per_request(&self) -> usize {
        self.max_events_per_request
    }

    /// Validate every payload of a request.
    ///
    /// Returns all events only if all of them are valid.
    pub fn validate_all(&self, payloads: &[Value]) -> Result<Vec<Event>, Vec<Violation>> {
        self.validate_all_at(payloads, Utc::now())
    }

    /// Like [`Self::validate_all`] with an explicit clock.
    pub fn validate_all_at(
        &self,
        payloads: &[Value],
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, Vec<Violation>> {
        let mut events = Vec::with_capacity(payloads.len());
        let mut violations = Vec::new();

        for (index, payload) in payloads.iter().enumerate() {
            match self.validate_at(index, payload, now) {
                Ok(event) => events.push(event),
                Err(found) => violations.extend(found),
            }
        }

        if violations.is_empty() {
            Ok(events)
        } else {
            Err(violations)
        }
    }

    /// Validate one payload; `index` is its position in the request.
    pub fn validate(&self, index: usize, payload: &Value) -> Result<Event, Vec<Violation>> {
        self.validate_at(index, payload, Utc::now())
    }

    /// Like [`Self::validate`] with an explicit clock.
    pub fn validate_at(
        &self,
        index: usize,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<Event, Vec<Violation>> {
        let Some(object) = payload.as_object() else {
            let error = ValidationError::InvalidType {
                field: "event".to_string(),
                expected: "a JSON object",
            };
            return Err(vec![Violation::new(index, "event", &error)]);
        };

        let mut fields = FieldReader {
            index,
            object,
            violations: Vec::new(),
        };

        let user_id = fields.required_string(USER_ID);
        let website_id = fields.required_string(WEBSITE_ID);
        let hook_type = fields.hook_type();
        let event_type = fields.required_string(EVENT_TYPE);
        let default_metadata = fields.metadata(DEFAULT_METADATA);
        let core_metadata = fields.metadata(CORE_METADATA);
        let element_metadata = fields.element_metadata();
        let timestamp = fields.timestamp(now, self.max_future_skew);

        match (user_id, website_id, hook_type, event_type, timestamp) {
            (Some(user_id), Some(website_id), Some(hook_type), Some(event_type), Some(timestamp))
                if fields.violations.is_empty() =>
            {
                Ok(Event {
                    user_id,
                    website_id,
                    hook_type,
                    event_type,
                    default_metadata,
                    core_metadata,
                    element_metadata,
                    timestamp,
                })
            }
            _ => Err(fields.violations),
        }
    }
}

/// An integer, or a float with no fractional part as JSON encoders emit them.
fn whole_millis(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Reads fields of one payload, recording violations as it goes.
struct FieldReader<'a> {
    index: usize,
    object: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl FieldReader<'_> {
    fn lookup(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .find_map(|name| self.object.get(*name))
            .filter(|value| !value.is_null())
    }

    fn reject(&mut self, field: &str, error: ValidationError) {
        self.violations.push(Violation::new(self.index, field, &error));
    }

    fn required_string(&mut self, names: &[&str]) -> Option<String> {
        let field = names[0];
        match self.lookup(names) {
            None => {
                self.reject(field, ValidationError::MissingField(field.to_string()));
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.reject(field, ValidationError::MissingField(field.to_string()));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.reject(
                    field,
                    ValidationError::InvalidType {
                        field: field.to_string(),
                        expected: "a string",
                    },
                );
                None
            }
        }
    }

    fn hook_type(&mut self) -> Option<HookType> {
        let raw = self.required_string(HOOK_TYPE)?;
        match raw.parse::<HookType>() {
            Ok(hook) => Some(hook),
            Err(_) => {
                self.reject(HOOK_TYPE[0], ValidationError::UnknownHookType(raw));
                None
            }
        }
    }

    fn metadata(&mut self, names: &[&str]) -> Map<String, Value> {
        match self.lookup(names) {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                self.reject(
                    names[0],
                    ValidationError::InvalidType {
                        field: names[0].to_string(),
                        expected: "a JSON object",
                    },
                );
                Map::new()
            }
        }
    }

    fn element_metadata(&mut self) -> Option<ElementMetadata> {
        let field = ELEMENT_METADATA[0];
        let value = self.lookup(ELEMENT_METADATA)?;
        let invalid = ValidationError::InvalidType {
            field: field.to_string(),
            expected: "an object of string fields",
        };

        if !value.is_object() {
            self.reject(field, invalid);
            return None;
        }
        match serde_json::from_value::<ElementMetadata>(value.clone()) {
            Ok(element) => Some(element),
            Err(_) => {
                self.reject(field, invalid);
                None
            }
        }
    }

    fn timestamp(&mut self, now: DateTime<Utc>, max_future_skew: Duration) -> Option<DateTime<Utc>> {
        let field = TIMESTAMP[0];
        let millis = match self.lookup(TIMESTAMP) {
            None => {
                self.reject(field, ValidationError::MissingField(field.to_string()));
                return None;
            }
            Some(value) => match whole_millis(value) {
                Some(ms) => ms,
                None => {
                    self.reject(
                        field,
                        ValidationError::InvalidType {
                            field: field.to_string(),
                            expected: "an integer of milliseconds since epoch",
                        },
                    );
                    return None;
                }
            },
        };

        if millis <= 0 {
            self.reject(
                field,
                ValidationError::InvalidTimestamp(format!("timestamp must be positive, got {millis}")),
            );
            return None;
        }

        let Some(at) = Utc.timestamp_millis_opt(millis).single() else {
            self.reject(
                field,
                ValidationError::InvalidTimestamp(format!("timestamp {millis} is out of range")),
            );
            return None;
        };

        let too_far = now
            .checked_add_signed(max_future_skew)
            .is_some_and(|limit| at > limit);
        if too_far {
            self.reject(
                field,
                ValidationError::InvalidTimestamp(format!(
                    "timestamp {millis} is more than {}s in the future",
                    max_future_skew.num_seconds()
                )),
            );
            return None;
        }

        Some(at)
    }
}
