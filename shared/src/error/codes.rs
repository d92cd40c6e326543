//! Unified error codes for the bundle pricing service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 6xxx: Catalog errors
//! - 7xxx: Bundle rule errors
//! - 8xxx: Cart errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Request-forgery token missing or invalid
    NonceInvalid = 1010,

    // ==================== 2xxx: Permission ====================
    /// Admin capability required
    AdminRequired = 2003,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price is invalid
    ProductPriceInvalid = 6003,

    // ==================== 7xxx: Bundle Rule ====================
    /// Bundle rule not found
    RuleNotFound = 7001,
    /// Rule payload is missing fields or malformed
    RuleInvalidData = 7002,
    /// Rule quantity below the bundle minimum
    RuleQuantityTooSmall = 7003,
    /// Rule has no categories
    RuleCategoriesEmpty = 7004,
    /// Rule bundle price is negative or not finite
    RulePriceInvalid = 7005,

    // ==================== 8xxx: Cart ====================
    /// Cart line item not found
    CartItemNotFound = 8001,
    /// Cart quantity is invalid
    CartQuantityInvalid = 8002,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::NonceInvalid => "Security check failed",

            // Permission
            ErrorCode::AdminRequired => "Admin capability required",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductPriceInvalid => "Product price is invalid",

            // Bundle rule
            ErrorCode::RuleNotFound => "Rule not found",
            ErrorCode::RuleInvalidData => "Invalid rule data",
            ErrorCode::RuleQuantityTooSmall => "Rule quantity must be at least 2",
            ErrorCode::RuleCategoriesEmpty => "Rule must target at least one category",
            ErrorCode::RulePriceInvalid => "Rule discount price is out of range",

            // Cart
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartQuantityInvalid => "Cart quantity is invalid",

            // System
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1010 => Ok(ErrorCode::NonceInvalid),

            // Permission
            2003 => Ok(ErrorCode::AdminRequired),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6003 => Ok(ErrorCode::ProductPriceInvalid),

            // Bundle rule
            7001 => Ok(ErrorCode::RuleNotFound),
            7002 => Ok(ErrorCode::RuleInvalidData),
            7003 => Ok(ErrorCode::RuleQuantityTooSmall),
            7004 => Ok(ErrorCode::RuleCategoriesEmpty),
            7005 => Ok(ErrorCode::RulePriceInvalid),

            // Cart
            8001 => Ok(ErrorCode::CartItemNotFound),
            8002 => Ok(ErrorCode::CartQuantityInvalid),

            // System
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
