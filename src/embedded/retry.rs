//! Reload Retry Policy
//!
//! The retry counter is carried in the page URL so it survives the full
//! reloads it triggers.

use url::Url;

/// Query parameter holding the attempt number
pub const ATTEMPT_PARAM: &str = "attempt";

/// Attempt number at which automatic reloads stop
pub const DEFAULT_RETRY_CEILING: u32 = 3;

/// What to do after a rendering failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Replace the current location with `url`
    Reload { url: String, attempt: u32 },
    /// Ceiling reached; stay on the failure view
    Exhausted { attempt: u32 },
}

/// Attempt number encoded in `url`; absent or unparsable means 1
///
/// A run of digits too large for `u32` saturates, so the counter never
/// wraps back below the ceiling.
pub fn current_attempt(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == ATTEMPT_PARAM)
        .and_then(|(_, value)| parse_attempt(value.trim()))
        .unwrap_or(1)
}

fn parse_attempt(raw: &str) -> Option<u32> {
    match raw.parse::<u32>() {
        Ok(attempt) => Some(attempt),
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Some(u32::MAX),
        Err(_) => None,
    }
}

/// `url` with its attempt parameter set to `attempt`
///
/// The first existing `attempt` pair is updated in place and any others are
/// dropped; all other parameters keep their order.
pub fn with_attempt(url: &Url, attempt: u32) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;

    for (key, value) in url.query_pairs().into_owned() {
        if key == ATTEMPT_PARAM {
            if !replaced {
                pairs.push((key, attempt.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key, value));
        }
    }
    if !replaced {
        pairs.push((ATTEMPT_PARAM.to_string(), attempt.to_string()));
    }

    let mut next = url.clone();
    next.query_pairs_mut().clear().extend_pairs(pairs);
    next
}

/// Decide whether a failure on `url` earns another reload
pub fn next_attempt(url: &Url, ceiling: u32) -> RetryDecision {
    let attempt = current_attempt(url);
    if attempt >= ceiling {
        return RetryDecision::Exhausted { attempt };
    }

    let next = attempt + 1;
    RetryDecision::Reload {
        url: with_attempt(url, next).to_string(),
        attempt: next,
    }
}
