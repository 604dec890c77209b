//! Attribute macros for the `strand` runtime.
//!
//! Both macros rewrite an `async fn` into a synchronous one that builds a
//! runtime and drives the original body with `block_on`. Options map to
//! `RuntimeBuilder` settings:
//!
//! ```rust,ignore
//! #[strand::main(blocking_threads = 8, shutdown_grace_ms = 250)]
//! async fn main() { /* ... */ }
//! ```

mod utils;

use proc_macro::{TokenStream, TokenTree};
use utils::Options;

/// Runs an `async fn main` on a new strand runtime.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = match Options::parse(attr) {
        Ok(options) => options,
        Err(message) => return utils::error(&message),
    };

    match utils::wrap_in_runtime(item, &options) {
        Ok(tokens) => tokens.into_iter().collect(),
        Err(message) => utils::error(&message),
    }
}

/// Runs an `async fn` test on its own strand runtime.
///
/// Accepts the same options as [`main`].
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = match Options::parse(attr) {
        Ok(options) => options,
        Err(message) => return utils::error(&message),
    };

    let tokens = match utils::wrap_in_runtime(item, &options) {
        Ok(tokens) => tokens,
        Err(message) => return utils::error(&message),
    };

    let test_attr: TokenStream = "#[::core::prelude::v1::test]".parse().unwrap_or_default();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
