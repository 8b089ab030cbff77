//! Runtime invariant checks for the capture session
//!
//! Session-mutating code asserts its structural invariants through
//! [`assert_invariant!`]; every checked invariant is recorded per thread so
//! tests can confirm that a code path actually exercised the checks it relies
//! on.
//!
//! ```rust,ignore
//! use saycheese::invariant_ppt::*;
//!
//! assert_invariant!(
//!     inputs.len() <= 1,
//!     "Session holds at most one device input",
//!     "session"
//! );
//!
//! contract_test("switch", &["Session holds at most one device input"]);
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::thread_local;

pub const AT_MOST_ONE_INPUT: &str = "Session holds at most one device input";
pub const POSITION_MATCHES_INPUT: &str = "Bound position mirrors the session's bound input";
pub const RECORDING_HAS_PATH: &str = "Recording state owns exactly one output path";

thread_local! {
    static INVARIANT_LOG: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Assert an invariant and log it for contract testing.
///
/// # Panics
/// Panics if the condition is false.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __assert_invariant_impl(condition: bool, message: &str, context: Option<&str>) {
    INVARIANT_LOG.with(|log| {
        log.borrow_mut().insert(message.to_string());
    });

    if !condition {
        let ctx = context.unwrap_or("unknown");
        panic!("INVARIANT VIOLATION [{}]: {}", ctx, message);
    }
}

/// Check that the listed invariants were verified on this thread.
///
/// # Panics
/// Panics if any required invariant was not checked.
pub fn contract_test(test_name: &str, required_invariants: &[&str]) {
    let log = INVARIANT_LOG.with(|log| log.borrow().clone());

    let missing: Vec<&str> = required_invariants
        .iter()
        .copied()
        .filter(|invariant| !log.contains(*invariant))
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: The following invariants were not checked:\n  - {}",
            test_name,
            missing.join("\n  - ")
        );
    }
}

/// Clear the invariant log for this thread
pub fn clear_invariant_log() {
    INVARIANT_LOG.with(|log| {
        log.borrow_mut().clear();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_invariant_satisfies_contract() {
        clear_invariant_log();
        assert_invariant!(true, AT_MOST_ONE_INPUT, "test");
        contract_test("single input", &[AT_MOST_ONE_INPUT]);
    }

    #[test]
    #[should_panic(expected = "CONTRACT FAILURE")]
    fn unchecked_invariant_fails_contract() {
        clear_invariant_log();
        contract_test("nothing checked", &[RECORDING_HAS_PATH]);
    }

    #[test]
    #[should_panic(expected = "INVARIANT VIOLATION [session]")]
    fn violated_invariant_panics() {
        assert_invariant!(false, POSITION_MATCHES_INPUT, "session");
    }
}
