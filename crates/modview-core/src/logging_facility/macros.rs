//! Canonical logging macros
//!
//! Every macro stamps `component` with the calling module and `event` with one
//! of the names from `modview_core_types::schema`.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use modview_core::log_op_start;
/// log_op_start!("enumerate_children");
/// log_op_start!("enumerate_children", key = "interfaces");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use modview_core::log_op_end;
/// log_op_end!("enumerate_children", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into [`ExError`](crate::errors::ExError).
///
/// # Example
///
/// ```
/// # use modview_core::log_op_error;
/// # use modview_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Deserialization);
/// log_op_error!("data_after", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($field)*
        );
    }};
}

/// Log a best-effort skip at debug level
///
/// Used when a single child cannot be projected but the surrounding
/// operation carries on without it.
///
/// # Example
///
/// ```
/// # use modview_core::log_skip;
/// # use modview_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::UnknownChild);
/// log_skip!("enumerate_children", &err, key = "vendor-extension");
/// ```
#[macro_export]
macro_rules! log_skip {
    ($op:expr, $err:expr, $($field:tt)*) => {{
        let ex_err: &$crate::errors::ExError = $err;
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_SKIP,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            reason = %ex_err,
            $($field)*
        );
    }};
}
