use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_error::abort;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, AttributeArgs, FnArg, ItemFn, Lit, NestedMeta, Pat, ReturnType};

pub(crate) fn route(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as AttributeArgs);
    let input = parse_macro_input!(input as ItemFn);

    match args.first() {
        Some(NestedMeta::Lit(Lit::Str(path))) if path.value().is_empty() => abort! {
            path.span(),
            "route cannot be empty";
            help = "if you want to match on index, use \"/\"";
        },
        Some(NestedMeta::Lit(Lit::Str(_))) => {}
        _ => abort!(Span::call_site(), "first argument of route needs to be the path as string literal"),
    }

    let ItemFn { attrs, vis, sig, block } = input;

    if sig.asyncness.is_none() {
        abort!(sig.fn_token, "route handler needs to be async");
    }

    if let ReturnType::Default = sig.output {
        abort!(sig.ident, "route handler needs to return anyhow::Result<impl Responder>");
    }

    let name = sig.ident.to_string();

    // The handler body moves into an inner function with the original signature,
    // the outer function keeps the extractors but answers with actix_web::Result
    let mut inner_sig = sig.clone();
    inner_sig.ident = Ident::new(format!("__inner_{}", name).as_str(), Span::call_site());
    let inner_ident = &inner_sig.ident;

    let arg_idents = sig.inputs.iter().map(|arg| match arg {
        FnArg::Typed(typed) => match &*typed.pat {
            Pat::Ident(pat_ident) => pat_ident.ident.to_token_stream(),
            other => abort!(other, "route handler arguments need to be plain identifiers"),
        },
        FnArg::Receiver(receiver) => abort!(receiver, "route handler cannot take self"),
    }).collect::<Vec<TokenStream2>>();

    let mut outer_sig = sig;
    outer_sig.output = syn::parse_quote!(-> actix_web::Result<impl actix_web::Responder>);

    TokenStream::from(quote! {
        #(#attrs)*
        #[actix_web::route(#(#args),*)]
        #[tracing::instrument(name = #name, skip_all)]
        #vis #outer_sig {
            #inner_sig #block

            #inner_ident(#(#arg_idents),*)
                .await
                .map_err(|err| actix_web::Error::from(crate::error::TrackerError::from(err)))
        }
    })
}
