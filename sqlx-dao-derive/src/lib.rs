//! Derive macros for sqlx-dao.
//!
//! - `#[derive(Dao)]` registers every `#[sql = "..."]` field of a struct as a statement slot.
//! - `#[derive(Record)]` maps a struct's fields to bind variables and result columns.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, FieldsNamed, Lit, LitStr, Meta, Type};

/// Derives `sqlx_dao::Dao`.
///
/// # Field Attributes
///
/// - `#[sql = "template"]` - Marks a `Sql<fn(..) -> ..>` field as a statement slot
///
/// The first field of type `ErrorSlot` becomes the shared error slot and is handed
/// to every slot before any is registered. Other fields are ignored. Slots are
/// registered in declaration order.
#[proc_macro_derive(Dao, attributes(sql))]
pub fn derive_dao(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_dao_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `sqlx_dao::Record` together with `Arg`, `Destination` and `Output`.
///
/// The struct must implement `Default`; every field type must convert into
/// `sqlx_dao::Value` and decode from a `sqlx::any::AnyRow` column.
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Matches this column name exactly instead of
///   the case-insensitive identifier match
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<&'a FieldsNamed> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} derive only supports structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} derive only supports structs"),
        )),
    }
}

fn derive_dao_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Dao")?;

    let mut error_slot = None;
    let mut attaches = Vec::new();
    let mut installs = Vec::new();

    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if let Some(template) = sql_template(&field.attrs)? {
            let name = ident.to_string();
            attaches.push(quote! {
                registrar.attach(&mut self.#ident);
            });
            installs.push(quote! {
                registrar.install(#name, #template, &mut self.#ident)?;
            });
        } else if error_slot.is_none() && is_error_slot(&field.ty) {
            error_slot = Some(quote! {
                registrar.error_slot(&self.#ident);
            });
        }
    }

    Ok(quote! {
        impl #impl_generics ::sqlx_dao::Dao for #struct_name #ty_generics #where_clause {
            fn register_slots(
                &mut self,
                registrar: &mut ::sqlx_dao::Registrar<'_>,
            ) -> ::sqlx_dao::Result<()> {
                #error_slot
                #(#attaches)*
                #(#installs)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Reads `#[sql = "..."]`.
fn sql_template(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    for attr in attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }

        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(expr_lit) = &nv.value {
                if let Lit::Str(lit) = &expr_lit.lit {
                    return Ok(Some(lit.clone()));
                }
            }
        }
        return Err(syn::Error::new_spanned(
            attr,
            "expected #[sql = \"statement template\"]",
        ));
    }
    Ok(None)
}

fn is_error_slot(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "ErrorSlot"),
        _ => false,
    }
}

fn derive_record_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Record")?;

    let mut field_defs = Vec::new();
    let mut decode_arms = Vec::new();
    let mut values = Vec::new();

    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ident_str = ident.to_string().trim_start_matches("r#").to_owned();
        let name = match column_name(&field.attrs)? {
            Some(name) => quote! { ::core::option::Option::Some(#name) },
            None => quote! { ::core::option::Option::None },
        };

        field_defs.push(quote! {
            ::sqlx_dao::Field::new(#ident_str, #name)
        });
        decode_arms.push(quote! {
            #index => {
                self.#ident = ::sqlx_dao::sqlx::Row::try_get(row, column)?;
            }
        });
        values.push(quote! {
            ::sqlx_dao::Value::from(::core::clone::Clone::clone(&self.#ident))
        });
    }

    Ok(quote! {
        impl #impl_generics ::sqlx_dao::Record for #struct_name #ty_generics #where_clause {
            const FIELDS: &'static [::sqlx_dao::Field] = &[#(#field_defs),*];

            fn decode_field(
                &mut self,
                field: usize,
                row: &::sqlx_dao::sqlx::any::AnyRow,
                column: usize,
            ) -> ::core::result::Result<(), ::sqlx_dao::sqlx::Error> {
                match field {
                    #(#decode_arms)*
                    _ => {
                        return ::core::result::Result::Err(
                            ::sqlx_dao::sqlx::Error::ColumnIndexOutOfBounds {
                                index: field,
                                len: <Self as ::sqlx_dao::Record>::FIELDS.len(),
                            },
                        );
                    }
                }
                ::core::result::Result::Ok(())
            }

            fn to_values(&self) -> ::std::vec::Vec<::sqlx_dao::Value> {
                ::std::vec![#(#values),*]
            }
        }

        impl #impl_generics ::sqlx_dao::Arg for #struct_name #ty_generics #where_clause {
            const KIND: ::sqlx_dao::ArgKind = ::sqlx_dao::ArgKind::Records;

            fn into_argument(self) -> ::sqlx_dao::Argument {
                ::sqlx_dao::Argument::Records(::std::vec![::sqlx_dao::RecordValues::of(&self)])
            }
        }

        impl #impl_generics ::sqlx_dao::Destination for #struct_name #ty_generics #where_clause {
            const SHAPE: ::sqlx_dao::Shape = ::sqlx_dao::Shape::Record;

            fn from_rows(
                rows: &[::sqlx_dao::sqlx::any::AnyRow],
            ) -> ::core::result::Result<Self, ::sqlx_dao::sqlx::Error> {
                ::sqlx_dao::materialize::first_record(rows)
            }
        }

        impl #impl_generics ::sqlx_dao::Output for #struct_name #ty_generics #where_clause {
            type Value = Self;

            fn finish(outcome: ::sqlx_dao::Result<Self>) -> Self {
                outcome.unwrap_or_default()
            }
        }
    })
}

/// Reads `#[column(name = "...")]`.
fn column_name(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported column attribute, expected `name`"))
            }
        })?;
    }
    Ok(name)
}
