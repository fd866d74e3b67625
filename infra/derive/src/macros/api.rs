use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, Lit, LitStr, Meta, MetaNameValue, Token};

struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

/// Adds the derives and serde defaults every JSON model in the gateway shares.
pub fn expand_model(args: TokenStream, input: &syn::DeriveInput) -> TokenStream {
    let args = match parse_model_args(args) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error(),
    };

    let derives = derived_traits(&input.attrs);
    let (serde_rename, serde_deny) = serde_flags(&input.attrs);

    let mut missing = Vec::new();
    if !derives.contains("Debug") {
        missing.push(quote!(Debug));
    }
    if !derives.contains("Serialize") {
        missing.push(quote!(::serde::Serialize));
    }
    if !derives.contains("Deserialize") {
        missing.push(quote!(::serde::Deserialize));
    }
    if !derives.contains("ToSchema") {
        missing.push(quote!(::utoipa::ToSchema));
    }
    let derive_attr = if missing.is_empty() { quote!() } else { quote!(#[derive(#(#missing),*)]) };

    let rename = args
        .rename_all
        .unwrap_or_else(|| LitStr::new("camelCase", proc_macro2::Span::call_site()));
    let rename_attr = match serde_rename {
        Some(existing) if existing.value() != rename.value() => {
            return syn::Error::new_spanned(
                existing,
                "conflicting serde rename_all; drop it or pass api_model(rename_all = \"..\")",
            )
            .to_compile_error();
        }
        Some(_) => quote!(),
        None => quote!(#[serde(rename_all = #rename)]),
    };

    let deny_attr = if args.deny_unknown_fields && !serde_deny {
        quote!(#[serde(deny_unknown_fields)])
    } else {
        quote!()
    };

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Attaches `utoipa::path` to a handler without touching its signature.
pub fn expand_handler(args: TokenStream, input: &ItemFn) -> TokenStream {
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #body
    }
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
    let mut parsed = ModelArgs { rename_all: None, deny_unknown_fields: false };

    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(meta, "expected `key = value` arguments"));
        };
        if nv.path.is_ident("rename_all") {
            parsed.rename_all = Some(string_literal(&nv)?);
        } else if nv.path.is_ident("deny_unknown_fields") {
            parsed.deny_unknown_fields = bool_literal(&nv)?;
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok(parsed)
}

fn string_literal(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Str(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn bool_literal(nv: &MetaNameValue) -> syn::Result<bool> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Bool(lit) => Ok(lit.value),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

fn serde_flags(attrs: &[Attribute]) -> (Option<LitStr>, bool) {
    let mut rename = None;
    let mut deny = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                rename = Some(meta.value()?.parse::<LitStr>()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                deny = true;
            } else if meta.input.peek(Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    (rename, deny)
}

fn derived_traits(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                traits.insert(last.ident.to_string());
            }
            Ok(())
        });
    }
    traits
}
