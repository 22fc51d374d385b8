//! Derive macro for `graphwire` reflection.
//!
//! See [`Reflect`].

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

/// # Reflection Derivation
///
/// `#[derive(Reflect)]` implements the traversal surface for a type:
///
/// - `TypePath`
/// - `Typed`
/// - `Reflect`
/// - `Struct` (for `struct T { ... }`)
/// - `GetTypeMeta`
///
/// The type must implement `Default`; the generated `GetTypeMeta` always
/// carries a `TypeTraitDefault` capability so the read side can activate
/// instances of the type.
///
/// Unit structs (`struct T;`) are treated as `Opaque` rather than as
/// composite types.
///
/// ## Opaque Types
///
/// The `opaque` attribute forces a type to be treated as `Opaque` instead of
/// `Struct`: the macro will not inspect its fields, and the traversal engine
/// hands the whole value to the fallback codec. Opaque types must implement
/// `Debug` and `PartialEq` in addition to `Default`:
///
/// ```rust, ignore
/// #[derive(Reflect, Debug, Default, PartialEq)]
/// #[reflect(opaque)]
/// struct Blob { data: Vec<u8> }
/// ```
///
/// ## Serde Capabilities
///
/// The `serialize` and `deserialize` attributes mark the matching `serde`
/// implementations as available, inserting `TypeTraitSerialize` and
/// `TypeTraitDeserialize` into the generated `TypeMeta`. The
/// `SerdeFallback` codec resolves opaque values through these capabilities:
///
/// ```rust, ignore
/// #[derive(Reflect, Debug, Default, PartialEq, Serialize, Deserialize)]
/// #[reflect(opaque, serialize, deserialize)]
/// struct Blob { data: Vec<u8> }
/// ```
///
/// ## Limitations
///
/// Generic types, enums, unions, and tuple structs are not supported.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Flags collected from `#[reflect(...)]` attributes on the type.
#[derive(Default)]
struct ReflectAttrs {
    opaque: bool,
    serialize: bool,
    deserialize: bool,
}

impl ReflectAttrs {
    fn parse(ast: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in &ast.attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("opaque") {
                    attrs.opaque = true;
                } else if meta.path.is_ident("serialize") {
                    attrs.serialize = true;
                } else if meta.path.is_ident("deserialize") {
                    attrs.deserialize = true;
                } else {
                    return Err(meta.error(
                        "unknown reflect attribute, expected `opaque`, `serialize`, or `deserialize`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "#[derive(Reflect)] does not support generic types",
        ));
    }

    let attrs = ReflectAttrs::parse(ast)?;

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) if !attrs.opaque => Some(&named.named),
            Fields::Named(_) => None,
            Fields::Unit => None,
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &data.fields,
                    "#[derive(Reflect)] does not support tuple structs",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "#[derive(Reflect)] does not support enums",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "#[derive(Reflect)] does not support unions",
            ));
        }
    };

    let type_path_impl = impl_type_path(ast);
    let tokens = match fields {
        Some(fields) => {
            let typed_impl = impl_typed_struct(ast, fields);
            let reflect_impl = impl_reflect_struct(ast);
            let struct_impl = impl_struct(ast, fields);
            let meta_impl = impl_get_type_meta(ast, &attrs, Some(fields));
            quote! {
                #type_path_impl
                #typed_impl
                #reflect_impl
                #struct_impl
                #meta_impl
            }
        }
        None => {
            let typed_impl = impl_typed_opaque(ast);
            let reflect_impl = impl_reflect_opaque(ast);
            let meta_impl = impl_get_type_meta(ast, &attrs, None);
            quote! {
                #type_path_impl
                #typed_impl
                #reflect_impl
                #meta_impl
            }
        }
    };
    Ok(tokens)
}

/// Generate `TypePath` trait implementation tokens.
///
/// The path anchors at `module_path!()`, which expands where the derive is
/// used, so paths stay stable across compilations of the same source.
fn impl_type_path(ast: &DeriveInput) -> TokenStream2 {
    let ident = &ast.ident;
    let name = ident.to_string();

    quote! {
        impl ::graphwire::info::TypePath for #ident {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", #name)
            }

            #[inline]
            fn type_name() -> &'static str {
                #name
            }
        }
    }
}

/// Generate `Typed` trait implementation tokens for a composite type.
fn impl_typed_struct(
    ast: &DeriveInput,
    fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
) -> TokenStream2 {
    let ident = &ast.ident;
    let field_infos = fields.iter().enumerate().map(|(index, field)| {
        let name = field
            .ident
            .as_ref()
            .expect("named fields always carry an ident")
            .to_string();
        let ty = &field.ty;
        let index = index as u32;
        quote! {
            ::graphwire::info::FieldInfo::new::<#ty>(#name, #index)
        }
    });

    quote! {
        impl ::graphwire::info::Typed for #ident {
            fn type_info() -> &'static ::graphwire::info::TypeInfo {
                static CELL: ::graphwire::impls::NonGenericTypeInfoCell =
                    ::graphwire::impls::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    ::graphwire::info::TypeInfo::Struct(
                        ::graphwire::info::StructInfo::new::<#ident>(
                            ::std::vec::Vec::from([#(#field_infos),*]),
                        ),
                    )
                })
            }
        }
    }
}

/// Generate `Typed` trait implementation tokens for an opaque type.
fn impl_typed_opaque(ast: &DeriveInput) -> TokenStream2 {
    let ident = &ast.ident;

    quote! {
        impl ::graphwire::info::Typed for #ident {
            fn type_info() -> &'static ::graphwire::info::TypeInfo {
                static CELL: ::graphwire::impls::NonGenericTypeInfoCell =
                    ::graphwire::impls::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    ::graphwire::info::TypeInfo::Opaque(
                        ::graphwire::info::OpaqueInfo::new::<#ident>(),
                    )
                })
            }
        }
    }
}

fn impl_reflect_common(kind: TokenStream2) -> TokenStream2 {
    quote! {
        fn set(
            &mut self,
            value: ::std::boxed::Box<dyn ::graphwire::Reflect>,
        ) -> ::core::result::Result<(), ::std::boxed::Box<dyn ::graphwire::Reflect>> {
            *self = value.take::<Self>()?;
            ::core::result::Result::Ok(())
        }

        #[inline]
        fn reflect_kind(&self) -> ::graphwire::ops::ReflectKind {
            ::graphwire::ops::ReflectKind::#kind
        }

        #[inline]
        fn reflect_ref(&self) -> ::graphwire::ops::ReflectRef<'_> {
            ::graphwire::ops::ReflectRef::#kind(self)
        }

        #[inline]
        fn reflect_mut(&mut self) -> ::graphwire::ops::ReflectMut<'_> {
            ::graphwire::ops::ReflectMut::#kind(self)
        }
    }
}

/// Generate `Reflect` trait implementation tokens for a composite type.
fn impl_reflect_struct(ast: &DeriveInput) -> TokenStream2 {
    let ident = &ast.ident;
    let common = impl_reflect_common(quote!(Struct));

    quote! {
        impl ::graphwire::Reflect for #ident {
            #common

            fn reflect_partial_eq(
                &self,
                other: &dyn ::graphwire::Reflect,
            ) -> ::core::option::Option<bool> {
                ::graphwire::impls::struct_partial_eq(self, other)
            }

            fn reflect_debug(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                ::graphwire::impls::struct_debug(self, f)
            }
        }
    }
}

/// Generate `Reflect` trait implementation tokens for an opaque type.
fn impl_reflect_opaque(ast: &DeriveInput) -> TokenStream2 {
    let ident = &ast.ident;
    let common = impl_reflect_common(quote!(Opaque));

    quote! {
        impl ::graphwire::Reflect for #ident {
            #common

            fn reflect_partial_eq(
                &self,
                other: &dyn ::graphwire::Reflect,
            ) -> ::core::option::Option<bool> {
                ::core::option::Option::Some(
                    other.downcast_ref::<Self>() == ::core::option::Option::Some(self),
                )
            }

            fn reflect_debug(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                ::core::fmt::Debug::fmt(self, f)
            }
        }
    }
}

/// Generate `Struct` trait implementation tokens.
fn impl_struct(
    ast: &DeriveInput,
    fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
) -> TokenStream2 {
    let ident = &ast.ident;
    let field_len = fields.len();
    let idents: Vec<_> = fields.iter().filter_map(|field| field.ident.as_ref()).collect();
    let names: Vec<String> = idents.iter().map(ToString::to_string).collect();
    let indices: Vec<usize> = (0..field_len).collect();

    quote! {
        impl ::graphwire::ops::Struct for #ident {
            fn field(&self, name: &str) -> ::core::option::Option<&dyn ::graphwire::Reflect> {
                match name {
                    #(#names => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn ::graphwire::Reflect> {
                match name {
                    #(#names => ::core::option::Option::Some(&mut self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at(
                &self,
                index: usize,
            ) -> ::core::option::Option<&dyn ::graphwire::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn ::graphwire::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&mut self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            #[inline]
            fn field_len(&self) -> usize {
                #field_len
            }
        }
    }
}

/// Generate `GetTypeMeta` trait implementation tokens.
///
/// Always inserts `TypeTraitDefault`; `serialize`/`deserialize` capabilities
/// follow the parsed attributes. Composite types also register their field
/// types as dependencies.
fn impl_get_type_meta(
    ast: &DeriveInput,
    attrs: &ReflectAttrs,
    fields: Option<&syn::punctuated::Punctuated<syn::Field, syn::Token![,]>>,
) -> TokenStream2 {
    let ident = &ast.ident;

    let serialize = attrs.serialize.then(|| {
        quote! {
            meta.insert_trait::<::graphwire::registry::TypeTraitSerialize>(
                <::graphwire::registry::TypeTraitSerialize as
                    ::graphwire::registry::FromType<#ident>>::from_type(),
            );
        }
    });
    let deserialize = attrs.deserialize.then(|| {
        quote! {
            meta.insert_trait::<::graphwire::registry::TypeTraitDeserialize>(
                <::graphwire::registry::TypeTraitDeserialize as
                    ::graphwire::registry::FromType<#ident>>::from_type(),
            );
        }
    });

    let dependencies = fields.map(|fields| {
        let field_types = fields.iter().map(|field| &field.ty);
        quote! {
            fn register_dependencies(registry: &mut ::graphwire::registry::TypeRegistry) {
                #(registry.register::<#field_types>();)*
            }
        }
    });

    quote! {
        impl ::graphwire::registry::GetTypeMeta for #ident {
            fn get_type_meta() -> ::graphwire::registry::TypeMeta {
                let mut meta = ::graphwire::registry::TypeMeta::of::<#ident>();
                meta.insert_trait::<::graphwire::registry::TypeTraitDefault>(
                    <::graphwire::registry::TypeTraitDefault as
                        ::graphwire::registry::FromType<#ident>>::from_type(),
                );
                #serialize
                #deserialize
                meta
            }

            #dependencies
        }
    }
}
