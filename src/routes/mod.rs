/// Router Module Index
///
/// Organizes the routing surface into access-segregated modules. The route
/// guard classifies by path prefix, so the split below maps directly onto
/// the guard's configuration: everything under `/admin` is protected except
/// the session entry point.

/// Routes accessible to any client (anonymous, read-only catalog access).
/// Handlers must only surface published content; enforcement lives in the
/// repository queries.
pub mod public;

/// The session surface under `/admin`: login (the guard's single exempt
/// path), logout, and the caller's own profile.
pub mod session;

/// CRUD routes under `/admin`, reachable only through the route guard.
/// Every handler additionally re-checks the session via the `AuthUser`
/// extractor.
pub mod admin;
