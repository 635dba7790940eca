//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The shadow map, shadow cache and cookie paths do not fail for expected
//! conditions: unsupported shadow techniques are downgraded by the format
//! tables and skipped cookie draws are normal control flow. [`UmbraError`]
//! therefore only covers:
//! - GPU bootstrap failures (adapter / device requests)
//! - Shader template lookup and rendering failures
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, UmbraError>`.

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // GPU Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// The requested shader template is not embedded in the crate.
    #[error("Shader template not found: {0}")]
    ShaderTemplateNotFound(String),

    /// Template rendering failed (syntax error, undefined variable, ...).
    #[error("Shader template error: {0}")]
    ShaderTemplate(#[from] minijinja::Error),
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
