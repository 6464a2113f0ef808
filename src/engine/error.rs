//! Engine status codes and their typed error taxonomy
//!
//! Native index backends report failures as numeric status codes. The adapter
//! translates every code through a fixed table into [`EngineError`]; codes the
//! table does not know survive as [`EngineError::Unknown`] so they can still be
//! diagnosed.

use std::fmt;

use thiserror::Error;

/// Raw status code returned by a native index backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineCode(pub i32);

impl EngineCode {
    pub const SUCCESS: Self = Self(0);
    pub const INVALID_INIT: Self = Self(1);
    pub const INVALID_INDEX: Self = Self(2);
    pub const INVALID_VECTOR: Self = Self(3);
    pub const INVALID_RESULT: Self = Self(4);
    pub const INVALID_DIMENSIONS: Self = Self(5);
    pub const INVALID_ARGUMENT: Self = Self(6);
    pub const INVALID_ID: Self = Self(7);
    pub const INVALID_REF: Self = Self(8);
    pub const DUPLICATED_ENTRY: Self = Self(9);
    pub const NOT_FOUND_ID: Self = Self(10);
    pub const INDEX_EMPTY: Self = Self(11);
    pub const THREAD_ERROR: Self = Self(12);
    pub const SYSTEM_ERROR: Self = Self(13);
    pub const NOT_IMPLEMENTED: Self = Self(14);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl fmt::Display for EngineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed engine failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The handle was never allocated or has already been destroyed
    #[error("Index not initialized")]
    NotInitialized,

    #[error("Invalid initialization")]
    InvalidInit,

    #[error("Invalid index")]
    InvalidIndex,

    #[error("Invalid vector")]
    InvalidVector,

    #[error("Invalid result")]
    InvalidResult,

    #[error("Invalid dimensions")]
    InvalidDimensions,

    #[error("Invalid argument")]
    InvalidArgument,

    #[error("Invalid ID")]
    InvalidId,

    #[error("Invalid reference")]
    InvalidRef,

    #[error("Duplicated entry")]
    DuplicatedEntry,

    #[error("ID not found")]
    NotFoundId,

    #[error("Index is empty")]
    IndexEmpty,

    #[error("Thread error")]
    ThreadError,

    #[error("System error")]
    SystemError,

    #[error("Not implemented")]
    NotImplemented,

    #[error("Unknown error code: {0}")]
    Unknown(i32),
}

impl EngineError {
    /// Translate a raw status code. `SUCCESS` maps to `None`.
    pub fn from_code(code: EngineCode) -> Option<Self> {
        let err = match code {
            EngineCode::SUCCESS => return None,
            EngineCode::INVALID_INIT => Self::InvalidInit,
            EngineCode::INVALID_INDEX => Self::InvalidIndex,
            EngineCode::INVALID_VECTOR => Self::InvalidVector,
            EngineCode::INVALID_RESULT => Self::InvalidResult,
            EngineCode::INVALID_DIMENSIONS => Self::InvalidDimensions,
            EngineCode::INVALID_ARGUMENT => Self::InvalidArgument,
            EngineCode::INVALID_ID => Self::InvalidId,
            EngineCode::INVALID_REF => Self::InvalidRef,
            EngineCode::DUPLICATED_ENTRY => Self::DuplicatedEntry,
            EngineCode::NOT_FOUND_ID => Self::NotFoundId,
            EngineCode::INDEX_EMPTY => Self::IndexEmpty,
            EngineCode::THREAD_ERROR => Self::ThreadError,
            EngineCode::SYSTEM_ERROR => Self::SystemError,
            EngineCode::NOT_IMPLEMENTED => Self::NotImplemented,
            EngineCode(other) => Self::Unknown(other),
        };
        Some(err)
    }

    /// Translate a failed call. A backend that reports `SUCCESS` as an error
    /// is itself broken, which surfaces as `InvalidResult`.
    pub fn from_failure(code: EngineCode) -> Self {
        Self::from_code(code).unwrap_or(Self::InvalidResult)
    }

    /// Stable machine-readable name used in API error bodies
    pub fn as_code_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "ENGINE_NOT_INITIALIZED",
            Self::InvalidInit => "INVALID_INIT",
            Self::InvalidIndex => "INVALID_INDEX",
            Self::InvalidVector => "INVALID_VECTOR",
            Self::InvalidResult => "INVALID_RESULT",
            Self::InvalidDimensions => "INVALID_DIMENSIONS",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidRef => "INVALID_REF",
            Self::DuplicatedEntry => "DUPLICATED_ENTRY",
            Self::NotFoundId => "NOT_FOUND_ID",
            Self::IndexEmpty => "INDEX_EMPTY",
            Self::ThreadError => "THREAD_ERROR",
            Self::SystemError => "SYSTEM_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::Unknown(_) => "UNKNOWN_ENGINE_ERROR",
        }
    }
}
