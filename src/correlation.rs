use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::constants::correlation::{SEQUENCE_TOKEN_FORMAT, STAMP_RETRY_MILLIS};
use crate::types::{CorrelationId, SenderId, SequenceToken};

/// Issues collision-free wall-clock sequence tokens for correlation ids.
///
/// Every token returned by one stamper is distinct from every token it
/// returned before, even when callers generate faster than the clock
/// resolution: the stamper remembers what it has issued and waits out
/// the clock instead of handing the same millisecond stamp to two
/// dispatches.
#[derive(Default)]
pub struct CorrelationStamper {
    issued: Mutex<HashSet<SequenceToken>>,
}

impl CorrelationStamper {
    /// Create a stamper with no issued tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a sequence token never returned by this stamper before.
    pub fn next_token(&self) -> SequenceToken {
        loop {
            let token = Local::now().format(SEQUENCE_TOKEN_FORMAT).to_string();
            let mut issued = self.issued.lock().expect("issued token set poisoned");
            if issued.insert(token.clone()) {
                return token;
            }
            drop(issued);
            thread::sleep(Duration::from_millis(STAMP_RETRY_MILLIS));
        }
    }

    /// Return a full correlation id `<sender_id>-<sequence_token>`.
    pub fn correlation_id(&self, sender_id: &SenderId) -> CorrelationId {
        format!("{sender_id}-{}", self.next_token())
    }

    /// Number of tokens issued so far.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().expect("issued token set poisoned").len()
    }
}
