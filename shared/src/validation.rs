//! Validation utilities for the PackTrace supply-chain platform

use rust_decimal::Decimal;

// ============================================================================
// Crate and Batch Validations
// ============================================================================

/// Validate a crate QR code
/// Format: CR-MMDDYY-XXX (e.g., "CR-081524-001")
pub fn validate_qr_code(qr_code: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = qr_code.split('-').collect();

    if parts.len() != 3 {
        return Err("QR code must be in format CR-MMDDYY-XXX");
    }

    if parts[0] != "CR" {
        return Err("QR code must start with 'CR'");
    }

    if parts[1].len() != 6 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid date segment in QR code");
    }

    let month: u32 = parts[1][0..2].parse().map_err(|_| "Invalid month in QR code")?;
    let day: u32 = parts[1][2..4].parse().map_err(|_| "Invalid day in QR code")?;
    if !(1..=12).contains(&month) {
        return Err("Invalid month in QR code");
    }
    if !(1..=31).contains(&day) {
        return Err("Invalid day in QR code");
    }

    if parts[2].len() != 3 || !parts[2].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid sequence number in QR code");
    }

    Ok(())
}

/// Validate a crate weight in kilograms (must be strictly positive)
pub fn validate_weight(weight_kg: Decimal) -> Result<(), &'static str> {
    if weight_kg <= Decimal::ZERO {
        return Err("Weight must be greater than zero");
    }
    Ok(())
}

/// Validate a batch code format
/// Format: PT-YYMMDD-CODE-NNNN (e.g., "PT-240815-DOI-0001")
pub fn validate_batch_code(batch_code: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = batch_code.split('-').collect();

    if parts.len() != 4 {
        return Err("Batch code must be in format PT-YYMMDD-CODE-NNNN");
    }

    if parts[0] != "PT" {
        return Err("Batch code must start with 'PT'");
    }

    if parts[1].len() != 6 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid date segment in batch code");
    }

    if parts[2].is_empty()
        || !parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err("Invalid origin code in batch code");
    }

    if parts[3].len() != 4 || !parts[3].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid sequence number in batch code");
    }

    Ok(())
}

// ============================================================================
// Credential Validations
// ============================================================================

/// Validate a username (3-50 characters, no whitespace)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 50 {
        return Err("Username must be at most 50 characters");
    }
    if username.chars().any(|c| c.is_whitespace()) {
        return Err("Username must not contain whitespace");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}
