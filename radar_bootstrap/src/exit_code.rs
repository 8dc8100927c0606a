// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Exit Codes
//!
//! Sysexits.h-style exit codes, mapped from a terminal error at the
//! composition root. Bootstrap doesn't depend on `radar-domain`, so the
//! mapping works off `&dyn std::error::Error` plus an optional taxonomy
//! category string (`RadarError::category()`) supplied by the caller
//! rather than the concrete error type.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,
    UsageError = 64,
    DataError = 65,
    NoInput = 66,
    NoUser = 67,
    NoHost = 68,
    Unavailable = 69,
    Software = 70,
    OsError = 71,
    OsFile = 72,
    CantCreate = 73,
    IoError = 74,
    TempFail = 75,
    Protocol = 76,
    NoPerm = 77,
    Config = 78,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a taxonomy category (`RadarError::category()`) to an exit code,
    /// falling back to string heuristics on the error's `Display` text when
    /// no category is supplied.
    pub fn from_error_with_category(error: &dyn std::error::Error, category: Option<&str>) -> Self {
        if let Some(category) = category {
            match category {
                "config" => return ExitCode::Config,
                "lock_unavailable" => return ExitCode::Unavailable,
                "driver_failure" => return ExitCode::Software,
                "transient" => return ExitCode::TempFail,
                "fatal" => return ExitCode::Software,
                _ => {}
            }
        }
        Self::from_error(error)
    }

    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let message = error.to_string().to_lowercase();

        if message.contains("permission") || message.contains("access denied") {
            ExitCode::NoPerm
        } else if message.contains("not found") || message.contains("no such") {
            ExitCode::NoInput
        } else if message.contains("invalid") || message.contains("argument") {
            ExitCode::UsageError
        } else if message.contains("parse") || message.contains("format") {
            ExitCode::DataError
        } else if message.contains("io") || message.contains("read") || message.contains("write") {
            ExitCode::IoError
        } else if message.contains("config") {
            ExitCode::Config
        } else if message.contains("unavailable") || message.contains("not available") {
            ExitCode::Unavailable
        } else {
            ExitCode::Error
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "success",
            ExitCode::Error => "general error",
            ExitCode::UsageError => "command line usage error",
            ExitCode::DataError => "data format error",
            ExitCode::NoInput => "input not found",
            ExitCode::NoUser => "user unknown",
            ExitCode::NoHost => "host unknown",
            ExitCode::Unavailable => "service unavailable",
            ExitCode::Software => "internal software error",
            ExitCode::OsError => "operating system error",
            ExitCode::OsFile => "system file missing",
            ExitCode::CantCreate => "cannot create output file",
            ExitCode::IoError => "input/output error",
            ExitCode::TempFail => "temporary failure, retry later",
            ExitCode::Protocol => "protocol error",
            ExitCode::NoPerm => "permission denied",
            ExitCode::Config => "configuration error",
            ExitCode::Interrupted => "interrupted (SIGINT)",
            ExitCode::Terminated => "terminated (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    pub fn is_signal(self) -> bool {
        matches!(self, ExitCode::Interrupted | ExitCode::Terminated)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

/// Maps a `Result` to a process exit code for `fn main() -> ExitCode`-style
/// callers, logging the error before converting it.
pub fn map_error_to_exit_code<E: std::error::Error>(error: &E) -> ExitCode {
    tracing::error!("fatal error: {}", error);
    ExitCode::from_error(error)
}

pub fn result_to_exit_code<T, E: std::error::Error>(result: Result<T, E>) -> std::process::ExitCode {
    match result {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(e) => std::process::ExitCode::from(map_error_to_exit_code(&e).as_i32() as u8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestError(String);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for TestError {}

    #[test]
    fn default_is_success() {
        assert_eq!(ExitCode::default(), ExitCode::Success);
    }

    #[test]
    fn as_i32_matches_sysexits() {
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Terminated.as_i32(), 143);
    }

    #[test]
    fn from_error_heuristics() {
        assert_eq!(ExitCode::from_error(&TestError("permission denied".into())), ExitCode::NoPerm);
        assert_eq!(ExitCode::from_error(&TestError("resource not found".into())), ExitCode::NoInput);
        assert_eq!(ExitCode::from_error(&TestError("invalid argument".into())), ExitCode::UsageError);
        assert_eq!(ExitCode::from_error(&TestError("config missing".into())), ExitCode::Config);
        assert_eq!(ExitCode::from_error(&TestError("something broke".into())), ExitCode::Error);
    }

    #[test]
    fn from_error_with_category_prefers_category() {
        let err = TestError("anything".into());
        assert_eq!(ExitCode::from_error_with_category(&err, Some("lock_unavailable")), ExitCode::Unavailable);
        assert_eq!(ExitCode::from_error_with_category(&err, Some("transient")), ExitCode::TempFail);
        assert_eq!(ExitCode::from_error_with_category(&err, None), ExitCode::Error);
    }

    #[test]
    fn is_success_and_is_error() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::Success.is_error());
        assert!(ExitCode::Error.is_error());
    }

    #[test]
    fn is_signal() {
        assert!(ExitCode::Interrupted.is_signal());
        assert!(ExitCode::Terminated.is_signal());
        assert!(!ExitCode::Success.is_signal());
    }

    #[test]
    fn display_includes_code_and_description() {
        let text = format!("{}", ExitCode::UsageError);
        assert!(text.contains("64"));
        assert!(text.contains("usage"));
    }
}
