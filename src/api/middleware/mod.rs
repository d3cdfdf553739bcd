//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Rate limiter: login routes only, reject early before hashing
//! 2. Access guard: token verification + role check
//! 3. Audit logger: logs after the guard, has the caller identity

pub mod audit;
pub mod auth;
pub mod rate;
