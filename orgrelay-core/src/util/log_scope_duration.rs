/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Utility for measuring duration of a scope.

use std::time::Instant;

/// Leverage `Drop` trait to log when the struct goes out of scope.
///
/// Bind the returned value to a named variable (`let _scope = ...`), since
/// `let _ = ...` drops it immediately.
pub struct LogScopeDuration<'a> {
    level: log::Level,
    module_path: &'a str,
    scope_name: &'a str,
    start: Instant,
    min_micros_to_log: u128,
}

impl<'a> LogScopeDuration<'a> {
    /// Return a new instance or `None` if `level` is filtered for
    /// `module_path`.
    ///
    /// You can retrieve the module path of the caller using the `module_path!()` macro.
    pub fn new(
        level: log::Level,
        module_path: &'a str,
        scope_name: &'a str,
        min_micros_to_log: u64,
    ) -> Option<Self> {
        log::log_enabled!(target: module_path, level).then(|| Self {
            level,
            module_path,
            scope_name,
            start: Instant::now(),
            min_micros_to_log: u128::from(min_micros_to_log),
        })
    }

    /// Return the elapsed time since this instance was created in
    /// microseconds.
    pub fn elapsed_micros(&self) -> u128 {
        self.start.elapsed().as_micros()
    }
}

impl Drop for LogScopeDuration<'_> {
    fn drop(&mut self) {
        let duration_micros = self.elapsed_micros();
        if duration_micros >= self.min_micros_to_log {
            log::log!(target: self.module_path, self.level, "'{}' took {duration_micros} µs.", self.scope_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Initialize logging.
    pub fn init_logger() {
        let _ = env_logger::Builder::new()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    #[test]
    fn test_scoped_timer() {
        init_logger();
        let scope = LogScopeDuration::new(log::Level::Debug, module_path!(), "test_scoped_timer", 0);
        assert!(scope.is_some());
        let filtered = LogScopeDuration::new(
            log::Level::Trace,
            module_path!(),
            "filtered by log level",
            0,
        );
        assert!(filtered.is_none());
    }
}
