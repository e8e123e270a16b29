//! `#[derive(Params)]` implementation.
//!
//! The generated `write_fields` walks the struct's fields in declaration order
//! and pushes one entry per field into the form, honouring the serde
//! attributes that also shape the JSON body:
//!
//! | serde attribute | Generated behaviour |
//! |-----------------|---------------------|
//! | `rename = "…"` | wire name (explicit name wins over the identifier) |
//! | `skip_serializing_if = "…"` | guard: the field is skipped when the predicate holds |
//! | `flatten` | the nested value's `Params::write_fields` is called with the same form |
//! | `skip`, `skip_serializing` | field is not written at all |
//! | `rename_all = "…"` (container) | case rule applied to fields without `rename` |
//!
//! Attributes that change the serialized shape in ways the form cannot follow
//! (`serialize_with`, `with`, `getter`, and container `transparent`, `into`,
//! `tag`, `remote`) are compile errors.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, ExprPath, Fields, LitStr, Path, Token, spanned::Spanned};

// ============================================================================
// Attribute structures
// ============================================================================

/// What the serde attributes say about one field.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip_if: Option<ExprPath>,
    flatten: bool,
    skip: bool,
}

/// Container-level `rename_all` rule, as serde applies it to field names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_str(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Field identifiers are snake_case, so lower and snake keep them as is.
    fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply_to_field(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_params(input: &DeriveInput) -> syn::Result<TokenStream> {
    let krate = parse_crate_path(&input.attrs)?;
    let rename_all = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => {
                return Ok(generate_impl(input, &krate, Vec::new()));
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.span(),
                    "Params requires named fields; tuple structs have no wire names",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Params cannot be derived for enums; implement FormValue instead",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Params cannot be derived for unions",
            ));
        }
    };

    let mut writes = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new(field.span(), "expected a named field"));
        };

        let write = if attrs.flatten {
            quote! {
                #krate::Params::write_fields(&self.#ident, form)?;
            }
        } else {
            let wire_name = attrs.rename.unwrap_or_else(|| {
                let name = ident.to_string().trim_start_matches("r#").to_string();
                match rename_all {
                    Some(rule) => rule.apply_to_field(&name),
                    None => name,
                }
            });
            quote! {
                #krate::FormValue::write_to(&self.#ident, #wire_name, form)?;
            }
        };

        let guarded = match attrs.skip_if {
            Some(predicate) => quote! {
                if !#predicate(&self.#ident) {
                    #write
                }
            },
            None => write,
        };
        writes.push(guarded);
    }

    Ok(generate_impl(input, &krate, writes))
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_crate_path(attrs: &[Attribute]) -> syn::Result<Path> {
    for attr in attrs {
        if !attr.path().is_ident("params") {
            continue;
        }
        let mut krate = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                krate = Some(lit.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported params attribute; expected `crate = \"…\"`"))
            }
        })?;
        if let Some(path) = krate {
            return Ok(path);
        }
    }
    syn::parse_str("::courier_core")
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rename_all = None;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let lit = if meta.input.peek(Token![=]) {
                    Some(meta.value()?.parse::<LitStr>()?)
                } else {
                    // rename_all(serialize = "…", deserialize = "…")
                    let mut serialize = None;
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            serialize = Some(inner.value()?.parse::<LitStr>()?);
                            Ok(())
                        } else {
                            skip_meta(&inner)
                        }
                    })?;
                    serialize
                };
                if let Some(lit) = lit {
                    let rule = RenameRule::from_str(&lit.value())
                        .ok_or_else(|| syn::Error::new(lit.span(), "unknown rename_all rule"))?;
                    rename_all = Some(rule);
                }
                Ok(())
            } else if ["transparent", "into", "tag", "remote"]
                .iter()
                .any(|name| meta.path.is_ident(name))
            {
                Err(meta.error("Params cannot follow this serde container attribute; implement Params by hand"))
            } else {
                skip_meta(&meta)
            }
        })?;
    }

    Ok(rename_all)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    result.rename = Some(lit.value());
                } else {
                    // rename(serialize = "…", deserialize = "…")
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            let lit: LitStr = inner.value()?.parse()?;
                            result.rename = Some(lit.value());
                            Ok(())
                        } else {
                            skip_meta(&inner)
                        }
                    })?;
                }
            } else if meta.path.is_ident("skip_serializing_if") {
                let lit: LitStr = meta.value()?.parse()?;
                result.skip_if = Some(lit.parse()?);
            } else if meta.path.is_ident("flatten") {
                result.flatten = true;
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                result.skip = true;
            } else if ["serialize_with", "with", "getter"]
                .iter()
                .any(|name| meta.path.is_ident(name))
            {
                return Err(meta.error(
                    "Params cannot follow a custom serializer; implement FormValue for the field type instead",
                ));
            } else {
                skip_meta(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Consumes a serde attribute this derive does not care about.
fn skip_meta(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

// ============================================================================
// Code generation
// ============================================================================

fn generate_impl(input: &DeriveInput, krate: &Path, writes: Vec<TokenStream>) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let unused = writes.is_empty().then(|| quote! { let _ = form; });

    quote! {
        impl #impl_generics #krate::Params for #name #ty_generics #where_clause {
            fn write_fields(
                &self,
                form: &mut #krate::FormFields,
            ) -> ::core::result::Result<(), #krate::EncodingError> {
                #unused
                #(#writes)*
                ::core::result::Result::Ok(())
            }
        }
    }
}
