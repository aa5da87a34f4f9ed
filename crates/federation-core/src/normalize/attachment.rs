use serde_json::Value;
use tracing::debug;

use crate::pool::RawMap;
use crate::vocab::{Attachment, Property};

/// Attachments always end up as a sequence, possibly empty.
///
/// Raw attachment data that failed to decode is logged and dropped.
pub fn normalize_attachments(attachment: &mut Property<Attachment>, raw: &RawMap) {
    *attachment = match std::mem::take(attachment) {
        Property::One(single) => Property::Many(vec![single]),
        Property::Many(all) => Property::Many(all),
        Property::Absent => match raw.get("attachment") {
            None | Some(Value::Null) => Property::Many(Vec::new()),
            Some(other) => {
                debug!(raw = %other, "dropping undecodable attachment");
                Property::Many(Vec::new())
            }
        },
    };
}
