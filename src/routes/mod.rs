/// Router Module Index
///
/// Splits the board's routes by access level. Every path here is relative to the base path;
/// `paths::scope_to_base_path` rewrites incoming URIs into that form before matching.

/// Routes that never run the auth guard.
pub mod public;

/// The list view and the JSON API, each method router wrapped in the auth guard.
pub mod authenticated;

/// The admin view.
pub mod admin;
