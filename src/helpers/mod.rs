//! Helper functions for templates
//!
//! Date formatting in the site language and URL generation under the
//! configured root.

mod date;
mod url;

pub use date::*;
pub use url::*;
