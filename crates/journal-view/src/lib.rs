#![forbid(unsafe_code)]

//! Presentation layer for the journal: styled blocks, span estimation,
//! viewport windowing, and render throttling.
//!
//! Nothing here draws. The runtime hands the selected [`StyledBlock`]s to
//! an output sink.

pub mod block;
pub mod markup;
pub mod span;
pub mod throttle;
pub mod viewport;

pub use block::{BlockFormatter, StyledBlock};
pub use span::{SpanCache, SpanCacheStats, estimate_span};
pub use throttle::{RenderThrottle, ThrottleDecision, content_signature};
pub use viewport::{ViewportState, ViewportWindower, Window, WindowSource};
