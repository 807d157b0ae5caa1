//! HTTP protocol layer module
//!
//! Range parsing, content types and response builders, decoupled from the
//! streaming and upload logic that uses them.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, RangeRequest, ResolvedRange};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_health_response,
    build_html_response, build_json_error, build_json_response, build_options_response,
    build_stream_error_response, build_text_response, ResponseBody,
};
