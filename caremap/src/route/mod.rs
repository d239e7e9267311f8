//! Nearest-route resolution.
//!
//! Given the ranked facility set and the current location, requests a
//! driving route to the closest in-range facility from an external
//! routing provider, and manages in-flight and stale requests.
//!
//! # Staleness Discipline
//!
//! Every issued request carries a monotonically increasing sequence
//! number. When a newer request is issued before an older one resolves,
//! the older completion is discarded unconditionally by sequence
//! comparison - last-issued-wins, never last-resolved-wins. Arrival order
//! of the underlying asynchronous calls is irrelevant.
//!
//! # Components
//!
//! - [`RoutingProvider`] - external black-box route computation boundary
//! - [`HttpRoutingProvider`] - OSRM-style HTTP implementation
//! - [`NearestRouteResolver`] - issues sequenced requests for the ranked
//!   head and delivers completions back to the controller

mod provider;
mod resolver;

pub use provider::{
    BoxFuture, HttpRoutingProvider, RouteError, RoutePlan, RouteRequest, RoutingProvider,
    TravelMode,
};
pub use resolver::{NearestRouteResolver, RouteCompletion, RouteResult, RouteSeq};
