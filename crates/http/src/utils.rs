//! Utility macros shared by the codec and connection layers.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// Works like `assert!`, but produces an `Err` instead of panicking, which keeps
/// the parser's validation steps on the `?`/`Result` path.
///
/// ```ignore
/// ensure!(headers.len() <= max_headers, ParseError::too_many_headers(max_headers));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
