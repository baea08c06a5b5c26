use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, parse_macro_input, spanned::Spanned};

/// Variant attribute: #[weight(<integer expr>)]
///
/// Variants without the attribute get weight `0`, which the sampler reads
/// as "unset" and draws as if weighted `1`.
#[proc_macro_derive(WeightedEnum, attributes(weight))]
pub fn derive_weighted_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new(
            input.ident.span(),
            "WeightedEnum can only be derived for enums",
        )
        .to_compile_error()
        .into();
    };

    // Collect (variant_ident, weight_expr)
    let mut entries = Vec::new();

    for variant in &data_enum.variants {
        // Only fieldless enums are supported
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new(
                variant.span(),
                "WeightedEnum only supports fieldless variants",
            )
            .to_compile_error()
            .into();
        }

        let weight = match weight_expr(&variant.attrs) {
            Ok(Some(expr)) => quote! { (#expr) },
            Ok(None) => quote! { 0 },
            Err(err) => return err.to_compile_error().into(),
        };

        let ident = &variant.ident;
        entries.push(quote! { (Self::#ident, #weight) });
    }

    let expanded = quote! {
        impl ::weightedrand::WeightedEnum for #enum_ident {
            const ENTRIES: &'static [(Self, u64)] = &[
                #(#entries),*
            ];
        }

        impl #enum_ident {
            /// Build an `AliasTable<#enum_ident>` from annotated weights.
            pub fn alias_table() -> ::core::result::Result<::weightedrand::AliasTable<Self>, ::weightedrand::WeightError>
            where
                Self: Copy
            {
                <Self as ::weightedrand::WeightedEnum>::alias_table()
            }
        }
    };

    expanded.into()
}

/// Find `#[weight(...)]` among a variant's attributes.
fn weight_expr(attrs: &[Attribute]) -> syn::Result<Option<Expr>> {
    let mut found = None;
    for Attribute { meta, .. } in attrs {
        if !meta.path().is_ident("weight") {
            continue;
        }
        let syn::Meta::List(list) = meta else {
            return Err(syn::Error::new(meta.span(), "use #[weight(<expr>)]"));
        };
        if found.is_some() {
            return Err(syn::Error::new(list.span(), "duplicate #[weight(...)]"));
        }
        let expr = syn::parse2::<Expr>(list.tokens.clone()).map_err(|e| {
            syn::Error::new(list.span(), format!("invalid weight expr: {e}"))
        })?;
        found = Some(expr);
    }
    Ok(found)
}
