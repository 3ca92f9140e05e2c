// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
// (none yet)

/// Marker trait for application-defined message payloads.
///
/// # Zero-Cost Abstraction
/// Uses a const `MESSAGE_TYPE` instead of runtime reflection, so message
/// type identification costs nothing at dispatch time.
///
/// # Example
/// ```rust
/// use strata_rt::message::Message;
///
/// #[derive(Debug, Clone)]
/// struct Ping;
///
/// impl Message for Ping {
///     const MESSAGE_TYPE: &'static str = "ping";
/// }
/// ```
pub trait Message: Send + Sync + Clone + Debug + 'static {
    /// Unique message type identifier, resolved at compile time.
    const MESSAGE_TYPE: &'static str;

    /// Whether this message type opts in to cached serialization: the
    /// encoded bytes may be computed once and reused across multiple
    /// deliveries of an equal payload (e.g. multicast to several
    /// endpoints). The serialization façade decides what to do with this;
    /// the runtime only plumbs the flag through.
    fn cached_serialization(&self) -> bool {
        false
    }
}
