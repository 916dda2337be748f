// Rendering — post text to HTML, photo extraction, and the two documents the
// service serves (Atom feed and the homepage form).
//
// All markup goes through maud so attribute values are always escaped.

pub mod feed;
pub mod homepage;
pub mod linkify;
pub mod photos;

pub use linkify::linkify;
pub use photos::photos;
