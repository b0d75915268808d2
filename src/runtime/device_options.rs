/// Options for the native side of a graphics device.
///
/// # Example
///
/// ```
/// use glitz_blend::runtime::DeviceOptions;
///
/// let options = DeviceOptions::begin().check_errors(true).finish();
///
/// assert!(options.check_errors());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeviceOptions {
    check_errors: bool,
}

impl DeviceOptions {
    pub fn begin() -> DeviceOptionsBuilder {
        DeviceOptionsBuilder {
            check_errors: cfg!(debug_assertions),
        }
    }

    /// Whether native calls are followed by an error check.
    ///
    /// Defaults to `true` in debug builds and `false` in release builds.
    pub fn check_errors(&self) -> bool {
        self.check_errors
    }
}

impl Default for DeviceOptions {
    fn default() -> Self {
        DeviceOptions::begin().finish()
    }
}

pub struct DeviceOptionsBuilder {
    check_errors: bool,
}

impl DeviceOptionsBuilder {
    pub fn check_errors(mut self, check_errors: bool) -> Self {
        self.check_errors = check_errors;

        self
    }

    pub fn finish(self) -> DeviceOptions {
        DeviceOptions {
            check_errors: self.check_errors,
        }
    }
}
