use snafu::prelude::*;

pub type Result<T, E = BoxError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BoxError {
    #[snafu(display("Window needs 4 values (y1, x1, y2, x2), got {}", len))]
    InvalidWindow { len: usize },

    #[snafu(display("Window value `{}` is not a number: {}", value, source))]
    ParseWindow {
        source: std::num::ParseFloatError,
        value: String,
    },
    #[snafu(display("Read box file `{}` error: {}", path, source))]
    ReadBoxes {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Parse box file `{}` error: {}", path, source))]
    ParseBoxes {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Write output error: {}", source))]
    WriteOutput { source: serde_json::Error },

    #[snafu(display("Convert output tensor error: {}", message))]
    ConvertOutput { message: String },
    #[snafu(display("Load config `{}` error: {}", path, message))]
    LoadConfig { path: String, message: String },
    #[snafu(display("Row count mismatch: {} boxes vs {} rows", left, right))]
    RowCountMismatch { left: usize, right: usize },
}
