//! Conversion of internal `Result`s into canonical result records.
//!
//! Adapters implement every operation as an `async` block returning
//! [`Result<T>`](crate::error::Result) and wrap it in [`guard`] (or
//! [`guard_list`] for list operations). This is the only place an error turns
//! into a failure record, and the only place a panic is caught.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::{PanelError, Result};
use crate::types::{
    AccountInfoResult, AccountUpdateResult, DatabaseResult, HostingAccountResult,
    MailAccountResult,
};

/// A canonical result record that can describe a failure.
pub(crate) trait Outcome {
    fn failure(error: &PanelError) -> Self;
}

macro_rules! impl_outcome {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Outcome for $ty {
                fn failure(error: &PanelError) -> Self {
                    let message = error.to_string();
                    Self {
                        success: false,
                        error_code: Some(error.error_code()),
                        errors: vec![message.clone()],
                        message,
                        ..Self::default()
                    }
                }
            }
        )+
    };
}

impl_outcome!(
    HostingAccountResult,
    MailAccountResult,
    DatabaseResult,
    AccountUpdateResult,
    AccountInfoResult,
);

/// Run one operation, converting errors and panics into a failure record.
pub(crate) async fn guard<T, F>(panel: &str, operation: &str, fut: F) -> T
where
    T: Outcome,
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            log_failure(operation, &e);
            T::failure(&e)
        }
        Err(payload) => {
            let e = PanelError::unexpected(panel, panic_message(payload.as_ref()));
            log_failure(operation, &e);
            T::failure(&e)
        }
    }
}

/// Run one list operation; any failure yields an empty list.
///
/// An empty result therefore does not confirm that zero resources exist.
pub(crate) async fn guard_list<T, F>(panel: &str, operation: &str, fut: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(items)) => items,
        Ok(Err(e)) => {
            log::warn!("{operation} failed, returning empty list: {e}");
            Vec::new()
        }
        Err(payload) => {
            log::warn!(
                "[{panel}] {operation} panicked, returning empty list: {}",
                panic_message(payload.as_ref())
            );
            Vec::new()
        }
    }
}

fn log_failure(operation: &str, error: &PanelError) {
    if error.is_expected() {
        log::warn!("{operation} failed: {error}");
    } else {
        log::error!("{operation} failed: {error}");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with non-string payload".to_string())
}
