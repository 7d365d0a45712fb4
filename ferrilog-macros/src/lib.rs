//! Logging macros for `ferrilog`: `trace!`/`debug!`/`info!`/`warning!`/
//! `error!`. Each expands to a level check against the logger resolved
//! for the calling module's path, followed by a `Logger::log` call that
//! captures `file!()`/`line!()` as the record's source location.
//!
//! ```ignore
//! ferrilog_macros::info!("listener bound", "port" = 8080u16, "proto" = "tcp");
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{
  parse::{Parse, ParseStream},
  Expr, LitStr, Result, Token,
};

struct LogInput {
  message: Expr,
  fields: Vec<(LitStr, Expr)>,
}

impl Parse for LogInput {
  fn parse(input: ParseStream) -> Result<Self> {
    let message: Expr = input.parse()?;
    let mut fields = Vec::new();

    while input.peek(Token![,]) {
      input.parse::<Token![,]>()?;
      if input.is_empty() {
        break;
      }
      let key: LitStr = input.parse()?;
      input.parse::<Token![=]>()?;
      let value: Expr = input.parse()?;
      fields.push((key, value));
    }

    Ok(LogInput { message, fields })
  }
}

fn expand(input: TokenStream, level_ident: proc_macro2::TokenStream) -> TokenStream {
  let input = syn::parse_macro_input!(input as LogInput);
  let message = &input.message;
  let keys: Vec<_> = input.fields.iter().map(|(k, _)| k).collect();
  let values: Vec<_> = input.fields.iter().map(|(_, v)| v).collect();

  let expanded = quote! {
    {
      let __ferrilog_logger = ::ferrilog::get_logger(module_path!());
      if __ferrilog_logger.is_enabled(::ferrilog::LogLevel::#level_ident) {
        let __ferrilog_message = ::std::format!("{}", #message);
        __ferrilog_logger.log(
          ::ferrilog::LogLevel::#level_ident,
          &__ferrilog_message,
          &[#( (#keys, ::ferrilog::buffer::event::FieldValue::from(#values)) ),*],
          ::std::option::Option::Some(::ferrilog::record::SourceLocation {
            file: file!(),
            line: line!(),
          }),
        );
      }
    }
  };
  TokenStream::from(expanded)
}

/// Logs at `ferrilog::LogLevel::Trace`.
#[proc_macro]
pub fn trace(input: TokenStream) -> TokenStream {
  expand(input, quote! { Trace })
}

/// Logs at `ferrilog::LogLevel::Debug`.
#[proc_macro]
pub fn debug(input: TokenStream) -> TokenStream {
  expand(input, quote! { Debug })
}

/// Logs at `ferrilog::LogLevel::Info`.
#[proc_macro]
pub fn info(input: TokenStream) -> TokenStream {
  expand(input, quote! { Info })
}

/// Logs at `ferrilog::LogLevel::Warning`.
#[proc_macro]
pub fn warning(input: TokenStream) -> TokenStream {
  expand(input, quote! { Warning })
}

/// Logs at `ferrilog::LogLevel::Error`.
#[proc_macro]
pub fn error(input: TokenStream) -> TokenStream {
  expand(input, quote! { Error })
}
