use std::collections::{HashMap, HashSet};

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derives `conch::param::FromParam` for a fieldless enum, so it can be
/// bound like any other parameter.
///
/// # Usage
///
/// ```ignore
/// #[derive(ParamEnum)]
/// #[param(type_name = "environment")]
/// enum Target {
///     #[param(alias = "dev")]
///     Development,
///
///     #[param(name = "prod", alias = "production")]
///     Production,
/// }
/// ```
///
/// Each variant is matched case-insensitively by its name (the variant
/// identifier in lowercase unless `name` is given) or any `alias`. The names
/// become the slot's choices, so a prompt reads `Target (development/prod): `.
///
/// Variants carrying data cannot be bound and are rejected at compile time,
/// as are two variants answering to the same name.
#[proc_macro_derive(ParamEnum, attributes(param))]
pub fn derive_param_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_name = &input.ident;

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                enum_name,
                "ParamEnum can only be derived for enums",
            ))
        }
    };

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            enum_name,
            "ParamEnum needs at least one variant",
        ));
    }

    let type_name = enum_type_name(&input.attrs)?.unwrap_or_else(|| "choice".to_string());

    let mut variants = Vec::new();
    let mut claimed: HashMap<String, &syn::Ident> = HashMap::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "unsupported parameter type: ParamEnum variants cannot carry data",
            ));
        }
        let names = variant_names(variant)?;
        for name in &names {
            let lowered = name.to_lowercase();
            if let Some(owner) = claimed.get(&lowered) {
                return Err(syn::Error::new_spanned(
                    variant,
                    format!("parameter name '{}' is already used by {}", name, owner),
                ));
            }
            claimed.insert(lowered, &variant.ident);
        }
        variants.push((&variant.ident, names));
    }

    let parse_arms = variants.iter().map(|(ident, names)| {
        let lowered = names.iter().map(|name| name.to_lowercase());
        quote! {
            #(#lowered)|* => ::std::result::Result::Ok(#enum_name::#ident),
        }
    });

    let render_arms = variants.iter().map(|(ident, names)| {
        let primary = &names[0];
        quote! {
            #enum_name::#ident => ::std::string::String::from(#primary),
        }
    });

    let choices = variants.iter().map(|(_, names)| &names[0]);
    let expected = variants
        .iter()
        .map(|(_, names)| names[0].as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let expected = format!("expected one of: {}", expected);

    Ok(quote! {
        impl ::conch::param::FromParam for #enum_name {
            const TYPE_NAME: &'static str = #type_name;

            fn from_param(text: &str) -> ::std::result::Result<Self, ::std::string::String> {
                match text.trim().to_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => ::std::result::Result::Err(::std::string::String::from(#expected)),
                }
            }

            fn to_param(&self) -> ::std::string::String {
                match self {
                    #(#render_arms)*
                }
            }

            fn choices() -> ::std::option::Option<::std::vec::Vec<::std::string::String>> {
                ::std::option::Option::Some(::std::vec![
                    #(::std::string::String::from(#choices)),*
                ])
            }
        }
    })
}

/// Extract the type name from #[param(type_name = "...")] on the enum
fn enum_type_name(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut type_name = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("param")) {
        attr.meta.require_list()?;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                let value: LitStr = meta.value()?.parse()?;
                type_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `type_name = \"...\"`"))
            }
        })?;
    }
    Ok(type_name)
}

/// Primary name first, then aliases, from #[param(name = "..", alias = "..")]
fn variant_names(variant: &syn::Variant) -> syn::Result<Vec<String>> {
    let mut name = None;
    let mut aliases = Vec::new();

    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("param")) {
        attr.meta.require_list()?;
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            if value.value().trim().is_empty() {
                return Err(syn::Error::new_spanned(&value, "names cannot be empty"));
            }
            if meta.path.is_ident("name") {
                name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("alias") {
                aliases.push(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"` or `alias = \"...\"`"))
            }
        })?;
    }

    let mut names = vec![name.unwrap_or_else(|| variant.ident.to_string().to_lowercase())];
    names.extend(aliases);

    // An alias repeating the variant's own name is harmless; drop it.
    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.to_lowercase()));
    Ok(names)
}
