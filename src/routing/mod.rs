//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (walk table in declaration order)
//!     → matcher.rs (prefix test per rule)
//!     → Return: matched Route or no-match
//!
//! Route compilation (at startup):
//!     RouteConfig[]
//!     → parse targets into scheme + authority
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always matches the same route
//! - First match wins, in declaration order

pub mod matcher;
pub mod router;

pub use router::{Route, RouteError, RouteTable};
