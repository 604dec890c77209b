use proc_macro::{Delimiter, Group, Ident, Span, TokenStream, TokenTree};

/// Runtime settings accepted by `#[strand::main]` and `#[strand::test]`.
#[derive(Default)]
pub(crate) struct Options {
    blocking_threads: Option<usize>,
    shutdown_grace_ms: Option<u64>,
}

impl Options {
    /// Parses `key = value` pairs separated by commas.
    pub(crate) fn parse(attr: TokenStream) -> Result<Self, String> {
        let mut options = Options::default();

        for arg in split_args(attr) {
            let [key, eq, value] = arg.as_slice() else {
                return Err(format!(
                    "expected `key = value`, found `{}`",
                    tokens_to_string(&arg)
                ));
            };

            if !matches!(eq, TokenTree::Punct(p) if p.as_char() == '=') {
                return Err(format!("expected `=` after `{key}`"));
            }

            let value = value.to_string();

            match key.to_string().as_str() {
                "blocking_threads" => {
                    let n = value
                        .parse::<usize>()
                        .map_err(|_| format!("`blocking_threads` expects an integer, found `{value}`"))?;
                    options.blocking_threads = Some(n);
                }
                "shutdown_grace_ms" => {
                    let ms = value
                        .parse::<u64>()
                        .map_err(|_| format!("`shutdown_grace_ms` expects an integer, found `{value}`"))?;
                    options.shutdown_grace_ms = Some(ms);
                }
                other => return Err(format!("unknown runtime option `{other}`")),
            }
        }

        Ok(options)
    }

    /// Source of an expression building the configured runtime.
    fn builder(&self) -> String {
        let mut builder = String::from("::strand::RuntimeBuilder::new()");

        if let Some(n) = self.blocking_threads {
            builder.push_str(&format!(".blocking_threads({n})"));
        }

        if let Some(ms) = self.shutdown_grace_ms {
            builder.push_str(&format!(
                ".shutdown_grace(::std::time::Duration::from_millis({ms}))"
            ));
        }

        builder.push_str(".build().expect(\"failed to build strand runtime\")");
        builder
    }
}

/// Turns `async fn name() { body }` into a synchronous function driving
/// `body` to completion on a fresh runtime. The `async` keyword is
/// optional.
///
/// The original body group is kept as is so that errors inside it point
/// at the user's code.
pub(crate) fn wrap_in_runtime(item: TokenStream, options: &Options) -> Result<Vec<TokenTree>, String> {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    // The body runs inside an async block either way.
    if let Some(async_pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(async_pos);
    }

    let Some(pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return Err("expected a function body".to_string());
    };

    let body = tokens[pos].clone();

    let mut future: Vec<TokenTree> = vec![
        TokenTree::Ident(Ident::new("async", Span::call_site())),
        TokenTree::Ident(Ident::new("move", Span::call_site())),
    ];
    future.push(body);

    let prelude: TokenStream = format!("let runtime = {}; runtime.block_on", options.builder())
        .parse()
        .map_err(|err| format!("invalid runtime options: {err}"))?;

    let mut block: Vec<TokenTree> = prelude.into_iter().collect();
    block.push(TokenTree::Group(Group::new(
        Delimiter::Parenthesis,
        future.into_iter().collect(),
    )));

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, block.into_iter().collect()));

    Ok(tokens)
}

/// Expands to a `compile_error!` carrying `message`.
pub(crate) fn error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`.
/// Commas at the top level are used as separators.
fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into a Rust source string.
///
/// Inserts spaces between consecutive identifiers to avoid accidental
/// token merging (e.g. `foo bar` vs `foobar`).
fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_ident = false;

    for t in tokens {
        if prev_was_ident && matches!(t, TokenTree::Ident(_)) {
            out.push(' ');
        }

        out.push_str(&t.to_string());
        prev_was_ident = matches!(t, TokenTree::Ident(_));
    }

    out
}
