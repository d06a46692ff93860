//! Fluent access with a per-chain error policy.
//!
//! [`View`] accessors return `Result`. A [`Chain`] wraps a view for call sites
//! that prefer to read a whole series of values and look at the outcome once,
//! or that want to substitute defaults:
//!
//! ```
//! use conftree::{Document, ErrorPolicy, format::yaml::from_yaml_str};
//!
//! let doc = Document::new(from_yaml_str("server: {port: 8080}").unwrap());
//! let mut port = doc.view().chain(ErrorPolicy::CaptureError).at("server.port");
//! assert_eq!(port.int(), Some(8080));
//! assert!(port.check().is_ok());
//!
//! let mut timeout = doc.view().chain(ErrorPolicy::Silent).at("server.timeout");
//! assert_eq!(timeout.int_or_else(|| 30), 30);
//! ```
//!
//! Every failure is recorded as the chain's last error and then handled by
//! the policy. A success resets the captured state. A fallback may be used
//! once; using a second one before calling [`Chain::check`] or
//! [`Chain::reset`] panics, because the first failure was never looked at.

use crate::coerce::Coerce;
use crate::error::TreeError;
use crate::path::IntoPath;
use crate::value::{Mapping, TreeValue};
use crate::view::View;
use indexmap::IndexMap;
use std::time::Duration;

/// One plain and one `_or_else` method per [`View`] accessor of the same name.
macro_rules! accessors {
    ($($name:ident, $or_else:ident => $ty:ty;)*) => {
        $(
            pub fn $name(&mut self) -> Option<$ty> {
                self.read_with(View::$name)
            }

            pub fn $or_else(&mut self, fallback: impl FnOnce() -> $ty) -> $ty {
                self.read_with_or_else(View::$name, fallback)
            }
        )*
    };
}

/// What a [`Chain`] does with a failure that has no fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Panic with the error.
    #[default]
    FailFast,
    /// Keep the error for [`Chain::error`] / [`Chain::check`].
    CaptureError,
    /// Clear the ok flag read by [`Chain::is_ok`].
    CaptureFlag,
    /// Ignore the failure; accessors return `None`.
    Silent,
}

/// A view plus an error policy and the outcome state of the last access.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    view: Result<View<'a>, TreeError>,
    policy: ErrorPolicy,
    captured: Option<TreeError>,
    ok: bool,
    last_error: Option<TreeError>,
    fallback_used: bool,
}

impl<'a> Chain<'a> {
    pub fn new(view: View<'a>, policy: ErrorPolicy) -> Self {
        Chain {
            view: Ok(view),
            policy,
            captured: None,
            ok: true,
            last_error: None,
            fallback_used: false,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Navigate further. After a failed navigation the chain stays broken
    /// and every accessor fails with the navigation error.
    pub fn at(mut self, path: impl IntoPath) -> Self {
        let next = match &self.view {
            Ok(view) => view.at(path),
            Err(_) => return self,
        };
        match next {
            Ok(next) => {
                self.succeed();
                self.view = Ok(next);
            }
            Err(error) => {
                self.view = Err(error.clone());
                self.fail(error);
            }
        }
        self
    }

    /// The underlying view, if navigation succeeded.
    pub fn view(&self) -> Option<&View<'a>> {
        self.view.as_ref().ok()
    }

    accessors! {
        bool, bool_or_else => bool;
        int, int_or_else => i64;
        float, float_or_else => f64;
        string, string_or_else => String;
        duration, duration_or_else => Duration;
        list, list_or_else => &'a [TreeValue];
        map, map_or_else => &'a Mapping;
        list_bool, list_bool_or_else => Vec<bool>;
        list_int, list_int_or_else => Vec<i64>;
        list_float, list_float_or_else => Vec<f64>;
        list_string, list_string_or_else => Vec<String>;
        list_duration, list_duration_or_else => Vec<Duration>;
        map_bool, map_bool_or_else => IndexMap<String, bool>;
        map_int, map_int_or_else => IndexMap<String, i64>;
        map_float, map_float_or_else => IndexMap<String, f64>;
        map_string, map_string_or_else => IndexMap<String, String>;
        map_duration, map_duration_or_else => IndexMap<String, Duration>;
    }

    /// Read any [`Coerce`] type under the chain's policy.
    pub fn read<T: Coerce>(&mut self) -> Option<T> {
        self.read_with(View::coerce::<T>)
    }

    /// Read any [`Coerce`] type, substituting `fallback()` on failure.
    pub fn read_or_else<T: Coerce>(&mut self, fallback: impl FnOnce() -> T) -> T {
        self.read_with_or_else(View::coerce::<T>, fallback)
    }

    /// Run any [`View`] accessor under the chain's policy.
    pub fn read_with<T>(
        &mut self,
        access: impl FnOnce(&View<'a>) -> Result<T, TreeError>,
    ) -> Option<T> {
        let outcome = self.resolve(access);
        self.settle(outcome)
    }

    /// Run any [`View`] accessor, substituting `fallback()` on failure.
    ///
    /// # Panics
    ///
    /// If a fallback was already used since the last [`Chain::check`] or
    /// [`Chain::reset`].
    pub fn read_with_or_else<T>(
        &mut self,
        access: impl FnOnce(&View<'a>) -> Result<T, TreeError>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match self.resolve(access) {
            Ok(value) => {
                self.succeed();
                value
            }
            Err(error) => {
                if self.fallback_used {
                    panic!(
                        "fallback used twice without checking the error state (last error: {})",
                        error
                    );
                }
                self.fallback_used = true;
                self.record(error);
                fallback()
            }
        }
    }

    /// The captured error under [`ErrorPolicy::CaptureError`].
    pub fn error(&self) -> Option<&TreeError> {
        self.captured.as_ref()
    }

    /// False after an unhandled failure under [`ErrorPolicy::CaptureFlag`].
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// The most recent failure under any policy, including ones a fallback
    /// covered. Not cleared by later successes.
    pub fn last_error(&self) -> Option<&TreeError> {
        self.last_error.as_ref()
    }

    /// Observe the captured state and re-arm the fallback.
    pub fn check(&mut self) -> Result<(), TreeError> {
        self.fallback_used = false;
        match self.captured.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Clear all outcome state.
    pub fn reset(&mut self) {
        self.captured = None;
        self.ok = true;
        self.last_error = None;
        self.fallback_used = false;
    }

    fn resolve<T>(
        &self,
        access: impl FnOnce(&View<'a>) -> Result<T, TreeError>,
    ) -> Result<T, TreeError> {
        match &self.view {
            Ok(view) => access(view),
            Err(error) => Err(error.clone()),
        }
    }

    fn settle<T>(&mut self, outcome: Result<T, TreeError>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.succeed();
                Some(value)
            }
            Err(error) => {
                self.fail(error);
                None
            }
        }
    }

    fn succeed(&mut self) {
        self.captured = None;
        self.ok = true;
    }

    fn record(&mut self, error: TreeError) {
        self.last_error = Some(error);
    }

    fn fail(&mut self, error: TreeError) {
        match self.policy {
            ErrorPolicy::FailFast => panic!("{}", error),
            ErrorPolicy::CaptureError => self.captured = Some(error.clone()),
            ErrorPolicy::CaptureFlag => self.ok = false,
            ErrorPolicy::Silent => {}
        }
        self.record(error);
    }
}
