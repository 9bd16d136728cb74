use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Fields, LitStr, Type};

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    match expand(input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new_spanned(
                    other,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "Record can only be derived for structs with named fields",
            ));
        }
    };

    let table = container_table(&input.attrs)?
        .unwrap_or_else(|| ident.to_string().to_case(Case::Snake));

    let mut names = Vec::new();
    let mut arms = Vec::new();

    for field in fields {
        let options = FieldOptions::parse(&field.attrs)?;
        if options.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let name = options
            .rename
            .unwrap_or_else(|| field_ident.to_string());
        let value = field_value_expr(field_ident, &field.ty);

        arms.push(quote! {
            #name => #value,
        });
        names.push(name);
    }

    Ok(quote! {
        impl #impl_generics ::tablelayer::record::Record for #ident #ty_generics #where_clause {
            fn table_name() -> &'static str {
                #table
            }

            fn properties() -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn get(&self, property: &str) -> ::core::option::Option<::tablelayer::bson::Bson> {
                use ::tablelayer::bson::Bson;

                match property {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

///
/// FieldOptions
///

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

impl FieldOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = FieldOptions::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    options.rename = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }

        Ok(options)
    }
}

fn container_table(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut table = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;
    }

    Ok(table)
}

///
/// FieldCardinality
///

#[derive(Clone, Copy)]
enum FieldCardinality {
    One,
    Opt,
    Many,
}

fn field_value_expr(field_ident: &syn::Ident, field_ty: &Type) -> TokenStream {
    match classify_field(field_ty) {
        FieldCardinality::One => quote! {
            ::core::option::Option::Some(Bson::from(::core::clone::Clone::clone(&self.#field_ident)))
        },
        FieldCardinality::Opt => quote! {
            self.#field_ident
                .as_ref()
                .map(|inner| Bson::from(::core::clone::Clone::clone(inner)))
        },
        FieldCardinality::Many => quote! {
            ::core::option::Option::Some(Bson::Array(
                self.#field_ident
                    .iter()
                    .map(|inner| Bson::from(::core::clone::Clone::clone(inner)))
                    .collect()
            ))
        },
    }
}

fn classify_field(ty: &Type) -> FieldCardinality {
    if is_path_ident(ty, "Option") {
        FieldCardinality::Opt
    } else if is_path_ident(ty, "Vec") {
        FieldCardinality::Many
    } else {
        FieldCardinality::One
    }
}

fn is_path_ident(ty: &Type, ident: &str) -> bool {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == ident),
        _ => false,
    }
}
