use snafu::Snafu;

/// A type alias for `std::result::Result` with [`ExchangeError`] as the error
/// type, used throughout the dataset and conversion modules.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Represents errors that can occur while building, staging, or converting a
/// dataset. Each variant represents a different source of error.
#[derive(Debug, Snafu)]
pub enum ExchangeError {
    /// Represents an error from the Arrow library.
    #[snafu(display("Arrow error: {}", source), context(false))]
    Arrow { source: arrow::error::ArrowError },

    /// Represents an I/O error.
    #[snafu(display("I/O error: {}", source), context(false))]
    Io { source: std::io::Error },

    /// Represents a custom error with a descriptive message.
    #[snafu(display("Invalid argument: {}", message))]
    Custom { message: String },
}

/// Creates custom errors with context.
///
/// This macro generates a custom error of type `ExchangeError::Custom` with a
/// formatted message that includes the file and line number where the
/// macro was invoked.
#[macro_export]
macro_rules! err {
    ($desc:expr) => {
        $crate::error::ExchangeError::Custom {
            message: format!("{} at {}:{}", $desc, file!(), line!()),
        }
    };
    ($desc:expr, $err:expr) => {
        $crate::error::ExchangeError::Custom {
            message: format!(
                "{} caused by '{:?}' at {}:{}",
                $desc,
                $err,
                file!(),
                line!()
            ),
        }
    };
}
